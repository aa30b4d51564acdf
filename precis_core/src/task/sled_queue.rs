use async_trait::async_trait;
use sled::{Db, Tree};
use tokio::sync::Mutex;

use super::dto::TaskMessage;
use super::queue::{Delivery, TaskQueue};
use crate::error::{StoreError, TaskError};

/// Queue for embedded workers, persisted next to the task snapshots so pending
/// and reserved messages survive a restart.
///
/// Messages are keyed by `Db::generate_id`, big-endian, so tree order is
/// enqueue order. A reserved message keeps its key, which puts it back at the
/// head of the queue when it is released or recovered.
pub struct SledQueue {
    pending: Tree,
    reserved: Tree,
    db: Db,
    reserve_lock: Mutex<()>,
}

impl SledQueue {
    pub fn new(db: &Db) -> Result<Self, StoreError> {
        Ok(Self {
            pending: db.open_tree("precis_queue_pending")?,
            reserved: db.open_tree("precis_queue_reserved")?,
            db: db.clone(),
            reserve_lock: Mutex::new(()),
        })
    }

    pub fn temporary() -> Result<Self, StoreError> {
        Self::new(&sled::Config::new().temporary(true).open()?)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn reserved_len(&self) -> usize {
        self.reserved.len()
    }
}

fn receipt_key(delivery: &Delivery) -> Result<Vec<u8>, TaskError> {
    hex::decode(&delivery.receipt)
        .map_err(|e| TaskError::Queue(format!("Invalid receipt {}: {}", delivery.receipt, e)))
}

#[async_trait]
impl TaskQueue for SledQueue {
    async fn push(&self, message: &TaskMessage) -> Result<(), TaskError> {
        let payload = serde_json::to_vec(message)?;
        let key = self.db.generate_id()?.to_be_bytes();

        self.pending.insert(key, payload)?;
        self.pending.flush_async().await?;
        Ok(())
    }

    async fn reserve(&self) -> Result<Option<Delivery>, TaskError> {
        let _guard = self.reserve_lock.lock().await;

        let Some((key, payload)) = self.pending.first()? else {
            return Ok(None);
        };

        // Reserved before removal: a crash in between leaves the message under the
        // same key in both trees and `recover` folds it back into one.
        self.reserved.insert(&key, payload.clone())?;
        self.pending.remove(&key)?;

        match serde_json::from_slice::<TaskMessage>(&payload) {
            Ok(message) => Ok(Some(Delivery {
                message,
                receipt: hex::encode(&key),
            })),
            Err(e) => {
                self.reserved.remove(&key)?;
                Err(TaskError::Queue(format!("Failed to parse message: {}", e)))
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), TaskError> {
        self.reserved.remove(receipt_key(delivery)?)?;
        Ok(())
    }

    async fn release(&self, delivery: &Delivery) -> Result<(), TaskError> {
        let key = receipt_key(delivery)?;

        if let Some(payload) = self.reserved.get(&key)? {
            self.pending.insert(&key, payload)?;
            self.reserved.remove(&key)?;
        }

        Ok(())
    }

    async fn recover(&self) -> Result<usize, TaskError> {
        let _guard = self.reserve_lock.lock().await;
        let mut recovered = 0;

        for entry in self.reserved.iter() {
            let (key, payload) = entry?;
            self.pending.insert(&key, payload)?;
            self.reserved.remove(&key)?;
            recovered += 1;
        }

        if recovered > 0 {
            log::warn!("Recovered {} unacknowledged messages", recovered);
            self.pending.flush_async().await?;
        }

        Ok(recovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::dto::{SummarizeRequest, SummaryType};
    use crate::task::dto::TaskId;

    fn message(text: &str) -> TaskMessage {
        TaskMessage::from((TaskId::new(), SummarizeRequest::new(text, SummaryType::Brief, None)))
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = SledQueue::temporary().unwrap();
        let first = message("first");
        let second = message("second");

        queue.push(&first).await.unwrap();
        queue.push(&second).await.unwrap();
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.reserve().await.unwrap().unwrap().message, first);
        assert_eq!(queue.reserve().await.unwrap().unwrap().message, second);
        assert!(queue.reserve().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unacked_messages_are_recovered() {
        let queue = SledQueue::temporary().unwrap();
        let first = message("first");
        let second = message("second");
        queue.push(&first).await.unwrap();
        queue.push(&second).await.unwrap();

        let acked = queue.reserve().await.unwrap().unwrap();
        queue.ack(&acked).await.unwrap();
        let _lost = queue.reserve().await.unwrap().unwrap();

        assert!(queue.is_empty());
        assert_eq!(queue.reserved_len(), 1);
        assert_eq!(queue.recover().await.unwrap(), 1);
        assert_eq!(queue.reserved_len(), 0);
        assert_eq!(queue.reserve().await.unwrap().unwrap().message, second);
        assert_eq!(queue.recover().await.unwrap(), 1);
        assert_eq!(queue.recover().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_recovered_message_goes_before_newer_ones() {
        let queue = SledQueue::temporary().unwrap();
        let first = message("first");
        queue.push(&first).await.unwrap();

        let _lost = queue.reserve().await.unwrap().unwrap();
        queue.push(&message("second")).await.unwrap();
        queue.recover().await.unwrap();

        assert_eq!(queue.reserve().await.unwrap().unwrap().message, first);
    }

    #[tokio::test]
    async fn test_released_message_is_next() {
        let queue = SledQueue::temporary().unwrap();
        let first = message("first");
        queue.push(&first).await.unwrap();
        queue.push(&message("second")).await.unwrap();

        let delivery = queue.reserve().await.unwrap().unwrap();
        queue.release(&delivery).await.unwrap();

        assert_eq!(queue.reserve().await.unwrap().unwrap().message, first);
        assert_eq!(queue.recover().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_messages_survive_reopen() {
        let path = std::env::temp_dir().join(format!("precis-queue-{}", uuid::Uuid::new_v4()));
        let first = message("first");
        let second = message("second");

        {
            let db = sled::open(&path).unwrap();
            let queue = SledQueue::new(&db).unwrap();
            queue.push(&first).await.unwrap();
            queue.push(&second).await.unwrap();
            // Reserved and never acknowledged, as if the worker died.
            queue.reserve().await.unwrap().unwrap();
            db.flush_async().await.unwrap();
        }

        {
            let db = sled::open(&path).unwrap();
            let queue = SledQueue::new(&db).unwrap();

            assert_eq!(queue.recover().await.unwrap(), 1);
            assert_eq!(queue.reserve().await.unwrap().unwrap().message, first);
            assert_eq!(queue.reserve().await.unwrap().unwrap().message, second);
        }

        let _ = std::fs::remove_dir_all(&path);
    }
}
