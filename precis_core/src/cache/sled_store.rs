use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use super::store::{KeyValueStore, StoreStats};
use crate::error::StoreError;

#[derive(Serialize, Deserialize, Debug)]
struct StoredValue {
    expires_at_ms: i64,
    value: String,
}

/// Minimum gap between two expiry sweeps triggered by writes.
const SWEEP_INTERVAL_MS: i64 = 60_000;

/// Embedded store for running without Redis. Expiry is checked on read, and
/// expired entries are swept on `ping` and at most once a minute on write.
pub struct SledStore {
    db: Db,
    tree: Tree,
    hits: AtomicU64,
    misses: AtomicU64,
    last_sweep_ms: AtomicI64,
}

impl SledStore {
    pub fn new(db: Db) -> Result<Self, StoreError> {
        let tree = db.open_tree("precis_store")?;

        Ok(Self {
            db,
            tree,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            last_sweep_ms: AtomicI64::new(Utc::now().timestamp_millis()),
        })
    }

    pub fn temporary() -> Result<Self, StoreError> {
        Self::new(sled::Config::new().temporary(true).open()?)
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now().timestamp_millis();
        self.last_sweep_ms.store(now, Ordering::Relaxed);

        let mut purged = 0;
        for entry in self.tree.iter() {
            let (key, bytes) = entry?;
            let Ok(stored) = serde_json::from_slice::<StoredValue>(&bytes) else {
                continue;
            };

            // Only drop the exact value we inspected; a concurrent overwrite wins.
            if stored.expires_at_ms <= now
                && self
                    .tree
                    .compare_and_swap(&key, Some(bytes), None as Option<&[u8]>)?
                    .is_ok()
            {
                purged += 1;
            }
        }

        if purged > 0 {
            log::info!("Purged {} expired entries", purged);
        }

        Ok(purged)
    }

    fn sweep_due(&self, now_ms: i64) -> bool {
        let last = self.last_sweep_ms.load(Ordering::Relaxed);
        now_ms - last >= SWEEP_INTERVAL_MS
            && self
                .last_sweep_ms
                .compare_exchange(last, now_ms, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
    }
}

#[async_trait]
impl KeyValueStore for SledStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let Some(bytes) = self.tree.get(key)? else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        };

        let stored: StoredValue = serde_json::from_slice(&bytes)?;

        if stored.expires_at_ms <= Utc::now().timestamp_millis() {
            self.tree.remove(key)?;
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(stored.value))
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let now_ms = Utc::now().timestamp_millis();
        let stored = StoredValue {
            expires_at_ms: now_ms + ttl.as_millis() as i64,
            value,
        };

        self.tree.insert(key, serde_json::to_vec(&stored)?)?;

        if self.sweep_due(now_ms) {
            self.purge_expired()?;
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.purge_expired()?;
        self.db.flush_async().await?;
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let size = self.db.size_on_disk()?;

        Ok(StoreStats {
            connected_clients: 1,
            used_memory: format!("{:.2}K", size as f64 / 1024.0),
            keyspace_hits: self.hits.load(Ordering::Relaxed),
            keyspace_misses: self.misses.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = SledStore::temporary().unwrap();

        store
            .set_ex("summary:abc", "cached".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("summary:abc").await.unwrap(), Some("cached".to_string()));
        assert_eq!(store.get("summary:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = SledStore::temporary().unwrap();

        store.set_ex("k", "first".to_string(), Duration::from_secs(60)).await.unwrap();
        store.set_ex("k", "second".to_string(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let store = SledStore::temporary().unwrap();

        store.set_ex("k", "v".to_string(), Duration::from_millis(20)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.tree.contains_key("k").unwrap());
    }

    #[tokio::test]
    async fn test_expired_entries_are_purged_without_reads() {
        let store = SledStore::temporary().unwrap();

        store.set_ex("task:a", "a".to_string(), Duration::from_millis(20)).await.unwrap();
        store.set_ex("summary:b", "b".to_string(), Duration::from_millis(20)).await.unwrap();
        store.set_ex("summary:c", "c".to_string(), Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.purge_expired().unwrap(), 2);
        assert_eq!(store.tree.len(), 1);
        assert_eq!(store.get("summary:c").await.unwrap(), Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_ping_sweeps_expired_entries() {
        let store = SledStore::temporary().unwrap();

        store.set_ex("k", "v".to_string(), Duration::from_millis(20)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.ping().await.unwrap();

        assert!(store.tree.is_empty());
    }

    #[tokio::test]
    async fn test_write_triggers_sweep_once_interval_passed() {
        let store = SledStore::temporary().unwrap();

        store.set_ex("old", "v".to_string(), Duration::from_millis(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        store
            .last_sweep_ms
            .store(Utc::now().timestamp_millis() - SWEEP_INTERVAL_MS, Ordering::Relaxed);

        store.set_ex("new", "v".to_string(), Duration::from_secs(60)).await.unwrap();

        assert!(!store.tree.contains_key("old").unwrap());
        assert!(store.tree.contains_key("new").unwrap());
    }

    #[tokio::test]
    async fn test_stats_count_hits_and_misses() {
        let store = SledStore::temporary().unwrap();
        store.set_ex("k", "v".to_string(), Duration::from_secs(60)).await.unwrap();

        store.get("k").await.unwrap();
        store.get("k").await.unwrap();
        store.get("other").await.unwrap();
        store.ping().await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.keyspace_hits, 2);
        assert_eq!(stats.keyspace_misses, 1);
    }
}
