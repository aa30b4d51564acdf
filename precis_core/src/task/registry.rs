use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use super::dto::{TaskId, TaskSnapshot, TaskState};
use crate::cache::store::KeyValueStore;
use crate::error::TaskError;
use crate::summary::dto::SummarizationResult;

pub fn get_task_key(task_id: &TaskId) -> String {
    format!("task:{}", task_id)
}

/// Task snapshots in the shared key/value store, with the lifecycle
/// `pending -> processing -> {completed, failed}` enforced on every write.
#[derive(Clone)]
pub struct TaskRegistry {
    store: Arc<dyn KeyValueStore>,
    retention: Duration,
    stale_after: Duration,
    pending_timeout: Option<Duration>,
}

impl TaskRegistry {
    /// `stale_after` is how long a task may sit in `processing` before a read
    /// reports it failed.
    pub fn new(store: Arc<dyn KeyValueStore>, retention: Duration, stale_after: Duration) -> Self {
        Self {
            store,
            retention,
            stale_after,
            pending_timeout: None,
        }
    }

    /// Reads report a task failed once it has been `pending` for `timeout`,
    /// covering messages stranded with a consumer that never came back.
    pub fn with_pending_timeout(mut self, timeout: Duration) -> Self {
        self.pending_timeout = Some(timeout);
        self
    }

    pub async fn create(&self) -> Result<TaskSnapshot, TaskError> {
        let snapshot = TaskSnapshot::pending(TaskId::new());
        self.save(&snapshot).await?;

        log::info!("Task {} created", snapshot.task_id);
        Ok(snapshot)
    }

    pub async fn get(&self, task_id: &TaskId) -> Result<Option<TaskSnapshot>, TaskError> {
        let Some(snapshot) = self.read(task_id).await? else {
            return Ok(None);
        };

        let Some(error) = self.staleness(&snapshot) else {
            return Ok(Some(snapshot));
        };

        log::warn!("Task {}: {}, marking it failed", task_id, error);
        match self.fail(task_id, error).await {
            Ok(failed) => Ok(Some(failed)),
            // A worker finished it between our read and the write.
            Err(TaskError::Terminal(_)) => self.read(task_id).await,
            Err(e) => Err(e),
        }
    }

    /// Error to record when `snapshot` has sat in a non-terminal state too long.
    fn staleness(&self, snapshot: &TaskSnapshot) -> Option<String> {
        let now = Utc::now();

        match snapshot.state {
            TaskState::Processing { started_at } => {
                let elapsed = now.signed_duration_since(started_at).to_std().unwrap_or_default();
                (elapsed > self.stale_after).then(|| {
                    format!(
                        "Task did not finish within {} seconds",
                        self.stale_after.as_secs()
                    )
                })
            }
            TaskState::Pending => {
                let timeout = self.pending_timeout?;
                let waited = now
                    .signed_duration_since(snapshot.created_at)
                    .to_std()
                    .unwrap_or_default();
                (waited > timeout).then(|| {
                    format!("Task was not picked up within {} seconds", timeout.as_secs())
                })
            }
            _ => None,
        }
    }

    /// Moves a task into `processing`. A task already processing is restarted,
    /// which is what a redelivered message after a worker crash looks like.
    pub async fn begin(&self, task_id: &TaskId) -> Result<TaskSnapshot, TaskError> {
        self.transition(
            task_id,
            TaskState::Processing {
                started_at: Utc::now(),
            },
        )
        .await
    }

    pub async fn complete(
        &self,
        task_id: &TaskId,
        result: SummarizationResult,
        from_cache: bool,
    ) -> Result<TaskSnapshot, TaskError> {
        self.transition(
            task_id,
            TaskState::Completed {
                result,
                from_cache,
                completed_at: Utc::now(),
            },
        )
        .await
    }

    pub async fn fail(
        &self,
        task_id: &TaskId,
        error: impl Into<String>,
    ) -> Result<TaskSnapshot, TaskError> {
        self.transition(
            task_id,
            TaskState::Failed {
                error: error.into(),
                completed_at: Utc::now(),
            },
        )
        .await
    }

    async fn transition(&self, task_id: &TaskId, next: TaskState) -> Result<TaskSnapshot, TaskError> {
        let mut snapshot = self
            .read(task_id)
            .await?
            .ok_or(TaskError::UnknownTask(*task_id))?;

        if snapshot.state.is_terminal() {
            log::warn!(
                "Refusing to move task {} from {} to {}",
                task_id,
                snapshot.status(),
                next.status()
            );
            return Err(TaskError::Terminal(*task_id));
        }

        log::info!("Task {}: {} -> {}", task_id, snapshot.status(), next.status());
        snapshot.state = next;
        self.save(&snapshot).await?;

        Ok(snapshot)
    }

    async fn read(&self, task_id: &TaskId) -> Result<Option<TaskSnapshot>, TaskError> {
        match self.store.get(&get_task_key(task_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, snapshot: &TaskSnapshot) -> Result<(), TaskError> {
        let payload = serde_json::to_string(snapshot)?;
        self.store
            .set_ex(&get_task_key(&snapshot.task_id), payload, self.retention)
            .await?;
        Ok(())
    }
}
