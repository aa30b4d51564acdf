use std::sync::Arc;

use axum::extract::{Json, State};
use precis_core::summary::dto::{SummarizationResult, SummarizeRequest};
use precis_core::task::dto::TaskStatus;
use precis_core::worker::limits::run_with_time_limits;

use super::dto::TaskResponse;
use crate::{error::ErrorServer, state::ServerState};

#[utoipa::path(
    post,
    path = "/api/v1/summarize",
    request_body = SummarizeRequest,
    description = "Summarize text synchronously, serving repeated requests from the cache",
    responses(
        (status = 200, description = "Success", body = SummarizationResult),
        (status = 422, description = "Invalid request"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Summary generation failed"),
        (status = 504, description = "Time limit exceeded"),
    )
)]
pub async fn summarize(
    State(server_state): State<Arc<ServerState>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizationResult>, ErrorServer> {
    let request = request.validate(server_state.max_text_length())?;

    let summary = run_with_time_limits(
        server_state.time_limits(),
        "Synchronous summarization",
        server_state.coordinator().handle(&request),
    )
    .await??;

    Ok(Json(summary.result))
}

#[utoipa::path(
    post,
    path = "/api/v1/summarize/async",
    request_body = SummarizeRequest,
    description = "Submit text for background summarization",
    responses(
        (status = 200, description = "Task accepted", body = TaskResponse),
        (status = 422, description = "Invalid request"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Failed to submit task"),
    )
)]
pub async fn summarize_async(
    State(server_state): State<Arc<ServerState>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<TaskResponse>, ErrorServer> {
    let request = request.validate(server_state.max_text_length())?;

    let task_id = server_state
        .coordinator()
        .submit(request)
        .await
        .map_err(|e| {
            log::error!("Failed to submit task: {}", e);
            ErrorServer::internal()
        })?;

    Ok(Json(TaskResponse {
        task_id: task_id.to_string(),
        status: TaskStatus::Pending.to_string(),
        message: "Task submitted successfully".to_string(),
    }))
}
