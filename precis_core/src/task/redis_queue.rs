use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Direction};

use super::dto::TaskMessage;
use super::queue::{Delivery, TaskQueue};
use crate::error::TaskError;

/// Redis list queue. Producers push on the left, consumers atomically move the
/// rightmost message into their own processing list and remove it on ack.
#[derive(Clone)]
pub struct RedisQueue {
    connection: MultiplexedConnection,
    queue_name: String,
    processing_list: String,
}

pub fn get_processing_list(queue_name: &str, consumer_id: &str) -> String {
    format!("{}:processing:{}", queue_name, consumer_id)
}

impl RedisQueue {
    pub fn new(connection: MultiplexedConnection, queue_name: &str, consumer_id: &str) -> Self {
        Self {
            connection,
            queue_name: queue_name.to_string(),
            processing_list: get_processing_list(queue_name, consumer_id),
        }
    }
}

fn queue_error(action: &str, e: redis::RedisError) -> TaskError {
    TaskError::Queue(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl TaskQueue for RedisQueue {
    async fn push(&self, message: &TaskMessage) -> Result<(), TaskError> {
        let payload = serde_json::to_string(message)?;
        let mut connection = self.connection.clone();

        let _: () = connection
            .lpush(&self.queue_name, payload)
            .await
            .map_err(|e| queue_error("push message to Redis", e))?;

        Ok(())
    }

    async fn reserve(&self) -> Result<Option<Delivery>, TaskError> {
        let mut connection = self.connection.clone();

        let payload: Option<String> = connection
            .lmove(
                &self.queue_name,
                &self.processing_list,
                Direction::Right,
                Direction::Left,
            )
            .await
            .map_err(|e| queue_error("reserve message", e))?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        match serde_json::from_str::<TaskMessage>(&payload) {
            Ok(message) => Ok(Some(Delivery {
                message,
                receipt: payload,
            })),
            Err(e) => {
                // Unparseable messages would be redelivered forever.
                let _: () = connection
                    .lrem(&self.processing_list, 1, &payload)
                    .await
                    .map_err(|e| queue_error("drop invalid message", e))?;

                Err(TaskError::Queue(format!("Failed to parse message: {}", e)))
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), TaskError> {
        let mut connection = self.connection.clone();

        let _: () = connection
            .lrem(&self.processing_list, 1, &delivery.receipt)
            .await
            .map_err(|e| queue_error("acknowledge message", e))?;

        Ok(())
    }

    async fn release(&self, delivery: &Delivery) -> Result<(), TaskError> {
        let mut connection = self.connection.clone();

        let _: () = redis::pipe()
            .atomic()
            .lrem(&self.processing_list, 1, &delivery.receipt)
            .ignore()
            .rpush(&self.queue_name, &delivery.receipt)
            .ignore()
            .query_async(&mut connection)
            .await
            .map_err(|e| queue_error("push message back to Redis", e))?;

        Ok(())
    }

    async fn recover(&self) -> Result<usize, TaskError> {
        let mut connection = self.connection.clone();
        let mut recovered = 0;

        loop {
            let moved: Option<String> = connection
                .lmove(
                    &self.processing_list,
                    &self.queue_name,
                    Direction::Left,
                    Direction::Right,
                )
                .await
                .map_err(|e| queue_error("recover message", e))?;

            if moved.is_none() {
                break;
            }
            recovered += 1;
        }

        if recovered > 0 {
            log::warn!(
                "Recovered {} unacknowledged messages from {}",
                recovered,
                self.processing_list
            );
        }

        Ok(recovered)
    }
}
