use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::ai::handler::TextGenerator;
use crate::cache::handler::CacheService;
use crate::cache::sled_store::SledStore;
use crate::cache::store::{KeyValueStore, StoreStats};
use crate::coordinator::RequestCoordinator;
use crate::error::StoreError;
use crate::summary::dto::SummarizationResult;
use crate::summary::executor::SummaryExecutor;
use crate::task::registry::TaskRegistry;
use crate::task::sled_queue::SledQueue;

pub fn words(count: usize) -> String {
    (0..count)
        .map(|i| format!("word{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn sample_result(summary: &str) -> SummarizationResult {
    SummarizationResult {
        summary: summary.to_string(),
        original_length: 100,
        summary_length: 20,
        compression_ratio: 80.0,
        processing_time: 0.42,
    }
}

/// Returns the same text for every prompt and records the prompts it saw.
pub struct StaticGenerator {
    output: String,
    prompts: Mutex<Vec<String>>,
}

impl StaticGenerator {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, anyhow::Error> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.output.clone())
    }
}

pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, anyhow::Error> {
        Err(anyhow::anyhow!("provider down"))
    }
}

pub struct SlowGenerator {
    delay: Duration,
}

impl SlowGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TextGenerator for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, anyhow::Error> {
        tokio::time::sleep(self.delay).await;
        Ok("eventually".to_string())
    }
}

/// Store whose every call fails, as if Redis were unreachable.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn set_ex(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Coordinator over a temporary sled database. `cache_store` replaces the store
/// used for summaries only.
pub fn coordinator_with(
    generator: Arc<dyn TextGenerator>,
    cache_store: Option<Arc<dyn KeyValueStore>>,
) -> (RequestCoordinator, Arc<SledQueue>) {
    let db = sled::Config::new().temporary(true).open().unwrap();
    coordinator_on(&db, generator, cache_store)
}

pub fn coordinator_on(
    db: &sled::Db,
    generator: Arc<dyn TextGenerator>,
    cache_store: Option<Arc<dyn KeyValueStore>>,
) -> (RequestCoordinator, Arc<SledQueue>) {
    let store: Arc<dyn KeyValueStore> = Arc::new(SledStore::new(db.clone()).unwrap());
    let cache_store = cache_store.unwrap_or_else(|| store.clone());
    let queue = Arc::new(SledQueue::new(db).unwrap());

    let coordinator = RequestCoordinator::new(
        CacheService::new(cache_store, Duration::from_secs(3600)),
        SummaryExecutor::new(generator),
        TaskRegistry::new(store, Duration::from_secs(3600), Duration::from_secs(600)),
        queue.clone(),
    );

    (coordinator, queue)
}
