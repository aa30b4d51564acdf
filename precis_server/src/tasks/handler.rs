use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use precis_core::task::dto::TaskId;

use super::dto::TaskResultResponse;
use crate::{error::ErrorServer, state::ServerState};

#[utoipa::path(
    get,
    path = "/api/v1/tasks/{task_id}",
    params(("task_id" = String, Path, description = "Id returned by /summarize/async")),
    description = "Get the state and result of a background summarization task",
    responses(
        (status = 200, description = "Success", body = TaskResultResponse),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn get_task_result(
    State(server_state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResultResponse>, ErrorServer> {
    let not_found = || ErrorServer::new(StatusCode::NOT_FOUND, "Task not found");

    let task_id: TaskId = task_id.parse().map_err(|_| not_found())?;

    let snapshot = server_state
        .coordinator()
        .get_task(&task_id)
        .await
        .map_err(|e| {
            log::error!("Failed to get task result for {}: {}", task_id, e);
            ErrorServer::internal()
        })?
        .ok_or_else(not_found)?;

    Ok(Json(TaskResultResponse::from(snapshot)))
}
