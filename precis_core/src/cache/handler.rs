use std::sync::Arc;
use std::time::Duration;

use super::store::{KeyValueStore, StoreStats};
use crate::summary::dto::SummarizationResult;
use crate::summary::helpers::get_summary_cache_key;

/// Cache-aside access to summaries. Every store failure degrades to a miss or a
/// skipped write; nothing here returns an error to the caller.
#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl CacheService {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn get(&self, fingerprint: &str) -> Option<SummarizationResult> {
        let cache_key = get_summary_cache_key(fingerprint);

        let cached = match self.store.get(&cache_key).await {
            Ok(cached) => cached,
            Err(e) => {
                log::error!("Cache get error: {}", e);
                return None;
            }
        };

        let Some(cached) = cached else {
            log::info!("Cache miss for key: {}", cache_key);
            return None;
        };

        match serde_json::from_str::<SummarizationResult>(&cached) {
            Ok(result) => {
                log::info!("Cache hit for key: {}", cache_key);
                Some(result)
            }
            Err(e) => {
                log::error!("Discarding undecodable cache entry {}: {}", cache_key, e);
                None
            }
        }
    }

    /// Writes `result` with the configured TTL. Returns whether the write landed.
    pub async fn set(&self, fingerprint: &str, result: &SummarizationResult) -> bool {
        self.set_with_ttl(fingerprint, result, self.ttl).await
    }

    pub async fn set_with_ttl(
        &self,
        fingerprint: &str,
        result: &SummarizationResult,
        ttl: Duration,
    ) -> bool {
        let cache_key = get_summary_cache_key(fingerprint);

        let payload = match serde_json::to_string(result) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Cache set error: {}", e);
                return false;
            }
        };

        match self.store.set_ex(&cache_key, payload, ttl).await {
            Ok(()) => {
                log::info!("Cached data for key: {}", cache_key);
                true
            }
            Err(e) => {
                log::error!("Cache set error: {}", e);
                false
            }
        }
    }

    pub async fn health(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Cache health check failed: {}", e);
                false
            }
        }
    }

    pub async fn stats(&self) -> Option<StoreStats> {
        match self.store.stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                log::error!("Failed to read cache stats: {}", e);
                None
            }
        }
    }
}
