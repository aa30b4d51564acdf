use async_trait::async_trait;

use super::dto::TaskMessage;
use crate::error::TaskError;

/// A reserved message. It stays owned by the consumer until acknowledged.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub message: TaskMessage,
    pub receipt: String,
}

/// At-least-once task queue: a reserved message that is never acknowledged is
/// handed out again after `recover`.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn push(&self, message: &TaskMessage) -> Result<(), TaskError>;

    /// Reserves the oldest message, or `None` when the queue is empty.
    async fn reserve(&self) -> Result<Option<Delivery>, TaskError>;

    async fn ack(&self, delivery: &Delivery) -> Result<(), TaskError>;

    /// Hands a reserved message back so it is delivered again.
    async fn release(&self, delivery: &Delivery) -> Result<(), TaskError>;

    /// Puts reserved, unacknowledged messages back at the head of the queue.
    async fn recover(&self) -> Result<usize, TaskError>;
}
