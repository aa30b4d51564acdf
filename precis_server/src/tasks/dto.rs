use chrono::{DateTime, Utc};
use precis_core::summary::dto::SummarizationResult;
use precis_core::task::dto::{TaskSnapshot, TaskState};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct TaskResultResponse {
    pub task_id: String,
    pub status: String,
    pub result: Option<SummarizationResult>,
    pub error: Option<String>,
    pub from_cache: Option<bool>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Option<String>)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<TaskSnapshot> for TaskResultResponse {
    fn from(snapshot: TaskSnapshot) -> Self {
        let status = snapshot.status().to_string();
        let completed_at = snapshot.completed_at();

        let (result, error, from_cache) = match snapshot.state {
            TaskState::Completed {
                result, from_cache, ..
            } => (Some(result), None, Some(from_cache)),
            TaskState::Failed { error, .. } => (None, Some(error), None),
            TaskState::Pending | TaskState::Processing { .. } => (None, None, None),
        };

        Self {
            task_id: snapshot.task_id.to_string(),
            status,
            result,
            error,
            from_cache,
            created_at: snapshot.created_at,
            completed_at,
        }
    }
}
