use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::limits::{TimeLimits, run_with_time_limits};
use crate::coordinator::RequestCoordinator;
use crate::error::TaskError;
use crate::task::dto::TaskSnapshot;
use crate::task::queue::Delivery;

/// Fixed set of workers draining the task queue. The number of workers bounds
/// how many summaries are generated at once.
pub struct WorkerPool {
    coordinator: RequestCoordinator,
    consumer_id: String,
    concurrency: usize,
    limits: TimeLimits,
    poll_interval: Duration,
}

impl WorkerPool {
    pub fn new(
        coordinator: RequestCoordinator,
        consumer_id: &str,
        concurrency: usize,
        limits: TimeLimits,
        poll_interval: Duration,
    ) -> Self {
        Self {
            coordinator,
            consumer_id: consumer_id.to_string(),
            concurrency: concurrency.max(1),
            limits,
            poll_interval,
        }
    }

    /// Starts the workers. They stop once `shutdown` turns true (or its sender
    /// is dropped), finishing the message in hand first.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let pool = Arc::new(self);

        (0..pool.concurrency)
            .map(|worker_id| {
                let pool = pool.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move { pool.worker_loop(worker_id, shutdown).await })
            })
            .collect()
    }

    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let consumer_id = self.consumer_id.clone();

        for outcome in join_all(self.spawn(shutdown)).await {
            if let Err(e) = outcome {
                log::error!("[{}] Worker panicked: {}", consumer_id, e);
            }
        }
    }

    async fn worker_loop(&self, worker_id: usize, mut shutdown: watch::Receiver<bool>) {
        log::info!("[{}-{}] Worker started", self.consumer_id, worker_id);

        while !*shutdown.borrow() {
            match self.coordinator.queue().reserve().await {
                Ok(Some(delivery)) => {
                    if let Err(e) = self.process(delivery).await {
                        log::error!(
                            "[{}-{}] Task error: {}. Retrying in {:?}...",
                            self.consumer_id,
                            worker_id,
                            e,
                            self.poll_interval
                        );
                        if self.idle(&mut shutdown).await {
                            break;
                        }
                    }
                }
                Ok(None) => {
                    if self.idle(&mut shutdown).await {
                        break;
                    }
                }
                Err(e) => {
                    log::error!(
                        "[{}-{}] Queue error: {}. Retrying in {:?}...",
                        self.consumer_id,
                        worker_id,
                        e,
                        self.poll_interval
                    );
                    if self.idle(&mut shutdown).await {
                        break;
                    }
                }
            }
        }

        log::info!("[{}-{}] Worker stopped", self.consumer_id, worker_id);
    }

    /// Sleeps for one poll interval. Returns true when the pool should stop.
    async fn idle(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.poll_interval) => return false,
            changed = shutdown.changed() => {
                if changed.is_err() {
                    return true;
                }
            }
        }

        *shutdown.borrow()
    }

    /// Runs one delivery through the coordinator and commits the terminal state.
    /// Errors leave the message queued for another attempt.
    pub async fn process(&self, delivery: Delivery) -> Result<Option<TaskSnapshot>, TaskError> {
        let queue = self.coordinator.queue();
        let registry = self.coordinator.registry();
        let task_id = delivery.message.task_id;

        match registry.begin(&task_id).await {
            Ok(_) => {}
            Err(TaskError::Terminal(_)) => {
                log::info!("[{}] Task {} already finished, skipping", self.consumer_id, task_id);
                queue.ack(&delivery).await?;
                return Ok(None);
            }
            Err(TaskError::UnknownTask(_)) => {
                log::warn!("[{}] Task {} no longer exists, dropping", self.consumer_id, task_id);
                queue.ack(&delivery).await?;
                return Ok(None);
            }
            Err(e) => {
                queue.release(&delivery).await?;
                return Err(e);
            }
        }

        let label = format!("Task {}", task_id);
        let outcome = run_with_time_limits(
            self.limits,
            &label,
            self.coordinator.handle(&delivery.message.request),
        )
        .await;

        let committed = match outcome {
            Ok(Ok(summary)) => registry.complete(&task_id, summary.result, summary.from_cache).await,
            Ok(Err(e)) | Err(e) => registry.fail(&task_id, e.to_string()).await,
        };

        match committed {
            Ok(snapshot) => {
                log::info!(
                    "[{}] Task {} finished as {}",
                    self.consumer_id,
                    task_id,
                    snapshot.status()
                );
                queue.ack(&delivery).await?;
                Ok(Some(snapshot))
            }
            Err(TaskError::Terminal(_)) => {
                log::warn!(
                    "[{}] Task {} was finalized elsewhere, discarding this run",
                    self.consumer_id,
                    task_id
                );
                queue.ack(&delivery).await?;
                Ok(None)
            }
            Err(e) => {
                queue.release(&delivery).await?;
                Err(e)
            }
        }
    }
}
