use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct TaskResponse {
    pub task_id: String,
    pub status: String,
    pub message: String,
}
