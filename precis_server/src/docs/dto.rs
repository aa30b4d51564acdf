use crate::{error, info, summarize, tasks};
use precis_core::summary::dto::{SummarizationResult, SummarizeRequest, SummaryType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        info::handler::info,
        info::handler::health,
        info::handler::stats,
        summarize::handler::summarize,
        summarize::handler::summarize_async,
        tasks::handler::get_task_result,
    ),
    components(
        schemas(
            info::dto::Info,
            info::dto::HealthCheck,
            info::dto::Stats,
            summarize::dto::TaskResponse,
            tasks::dto::TaskResultResponse,
            SummarizeRequest,
            SummarizationResult,
            SummaryType,
        ),
        responses(error::ErrorServer)
    )
)]
pub struct ApiDoc;
