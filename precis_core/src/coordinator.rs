use std::sync::Arc;

use crate::cache::handler::CacheService;
use crate::cache::store::StoreStats;
use crate::error::{ExecutorError, TaskError};
use crate::summary::dto::{SummarizeRequest, Summary};
use crate::summary::executor::SummaryExecutor;
use crate::summary::fingerprint::request_fingerprint;
use crate::task::dto::{TaskId, TaskMessage, TaskSnapshot};
use crate::task::queue::TaskQueue;
use crate::task::registry::TaskRegistry;

/// Entry point shared by the synchronous API and the worker pool.
///
/// Identical requests arriving together before the first cache write may each
/// run the executor; no lock is taken across the lookup and the write.
#[derive(Clone)]
pub struct RequestCoordinator {
    cache: CacheService,
    executor: SummaryExecutor,
    registry: TaskRegistry,
    queue: Arc<dyn TaskQueue>,
}

impl RequestCoordinator {
    pub fn new(
        cache: CacheService,
        executor: SummaryExecutor,
        registry: TaskRegistry,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            cache,
            executor,
            registry,
            queue,
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn queue(&self) -> &Arc<dyn TaskQueue> {
        &self.queue
    }

    pub async fn handle(&self, request: &SummarizeRequest) -> Result<Summary, ExecutorError> {
        let fingerprint = request_fingerprint(request);

        if let Some(cached) = self.cache.get(&fingerprint).await {
            return Ok(Summary::from((cached, true)));
        }

        let result = self
            .executor
            .execute(&request.text, request.summary_type, request.max_words)
            .await?;

        // A failed write only costs a future cache hit.
        if !self.cache.set(&fingerprint, &result).await {
            log::warn!("Serving uncached summary for {}", fingerprint);
        }

        Ok(Summary::from((result, false)))
    }

    pub async fn submit(&self, request: SummarizeRequest) -> Result<TaskId, TaskError> {
        let snapshot = self.registry.create().await?;
        let task_id = snapshot.task_id;

        if let Err(e) = self.queue.push(&TaskMessage::from((task_id, request))).await {
            log::error!("Failed to enqueue task {}: {}", task_id, e);
            if let Err(mark_err) = self.registry.fail(&task_id, "Failed to submit task").await {
                log::error!("Failed to mark task {} as failed: {}", task_id, mark_err);
            }
            return Err(e);
        }

        Ok(task_id)
    }

    pub async fn get_task(&self, task_id: &TaskId) -> Result<Option<TaskSnapshot>, TaskError> {
        self.registry.get(task_id).await
    }

    pub async fn cache_health(&self) -> bool {
        self.cache.health().await
    }

    pub async fn cache_stats(&self) -> Option<StoreStats> {
        self.cache.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::dto::SummaryType;
    use crate::task::dto::TaskStatus;
    use crate::test_support::{
        FailingGenerator, FailingStore, StaticGenerator, coordinator_with, words,
    };

    fn request(word_count: usize) -> SummarizeRequest {
        SummarizeRequest::new(words(word_count), SummaryType::Brief, None)
    }

    #[tokio::test]
    async fn test_second_identical_request_hits_cache() {
        let generator = Arc::new(StaticGenerator::new("a compact summary"));
        let (coordinator, _queue) = coordinator_with(generator.clone(), None);
        let request = request(40);

        let first = coordinator.handle(&request).await.unwrap();
        let second = coordinator.handle(&request).await.unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.result, second.result);
        assert_eq!(generator.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_different_requests_do_not_share_cache() {
        let generator = Arc::new(StaticGenerator::new("a compact summary"));
        let (coordinator, _queue) = coordinator_with(generator.clone(), None);

        coordinator.handle(&request(40)).await.unwrap();
        let other = SummarizeRequest::new(words(40), SummaryType::Detailed, None);
        let outcome = coordinator.handle(&other).await.unwrap();

        assert!(!outcome.from_cache);
        assert_eq!(generator.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_brief_summary_of_forty_words() {
        let generator = Arc::new(StaticGenerator::new("the fox and the dog summarised"));
        let (coordinator, _queue) = coordinator_with(generator, None);

        let outcome = coordinator.handle(&request(40)).await.unwrap();

        assert_eq!(outcome.result.original_length, 40);
        assert!(outcome.result.summary_length <= 40);
        assert!((0.0..=100.0).contains(&outcome.result.compression_ratio));
    }

    #[tokio::test]
    async fn test_failing_cache_is_fail_open() {
        let generator = Arc::new(StaticGenerator::new("still works"));
        let (coordinator, _queue) = coordinator_with(generator.clone(), Some(Arc::new(FailingStore)));
        let request = request(40);

        for _ in 0..2 {
            let outcome = coordinator.handle(&request).await.unwrap();
            assert!(!outcome.from_cache);
            assert_eq!(outcome.result.summary, "still works");
        }

        assert_eq!(generator.prompts().len(), 2);
        assert!(!coordinator.cache_health().await);
    }

    #[tokio::test]
    async fn test_executor_failure_is_not_cached() {
        let (failing, _queue) = coordinator_with(Arc::new(FailingGenerator), None);
        let request = request(40);

        let err = failing.handle(&request).await.unwrap_err();
        assert!(matches!(err, ExecutorError::Generation(_)));

        // Same request again still reaches the executor.
        assert!(failing.handle(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_submit_creates_pending_task_and_enqueues() {
        let (coordinator, queue) = coordinator_with(Arc::new(StaticGenerator::new("s")), None);
        let request = request(40);

        let task_id = coordinator.submit(request.clone()).await.unwrap();

        let snapshot = coordinator.get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(snapshot.status(), TaskStatus::Pending);

        let delivery = queue.reserve().await.unwrap().unwrap();
        assert_eq!(delivery.message.task_id, task_id);
        assert_eq!(delivery.message.request, request);
    }

    #[tokio::test]
    async fn test_get_unknown_task() {
        let (coordinator, _queue) = coordinator_with(Arc::new(StaticGenerator::new("s")), None);
        assert!(coordinator.get_task(&TaskId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_health_and_stats() {
        let (coordinator, _queue) = coordinator_with(Arc::new(StaticGenerator::new("s")), None);
        assert!(coordinator.cache_health().await);
        assert!(coordinator.cache_stats().await.is_some());
    }
}
