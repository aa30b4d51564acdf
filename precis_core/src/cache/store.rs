use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::StoreError;

/// String key/value store with per-entry expiry, shared by the cache and the task registry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key` for `ttl`, replacing any existing entry.
    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn stats(&self) -> Result<StoreStats, StoreError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub connected_clients: u64,
    pub used_memory: String,
    pub keyspace_hits: u64,
    pub keyspace_misses: u64,
}

impl StoreStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = (self.keyspace_hits + self.keyspace_misses).max(1);
        crate::summary::helpers::round_two_decimals(self.keyspace_hits as f64 / total as f64 * 100.0)
    }
}
