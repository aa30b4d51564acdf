use redis::Client;
use std::sync::Arc;

use crate::ai::handler::TextGenerator;
use crate::cache::handler::CacheService;
use crate::cache::redis_store::RedisStore;
use crate::cache::sled_store::SledStore;
use crate::cache::store::KeyValueStore;
use crate::config::{Config, StoreBackend};
use crate::coordinator::RequestCoordinator;
use crate::error::StoreError;
use crate::summary::executor::SummaryExecutor;
use crate::task::queue::TaskQueue;
use crate::task::redis_queue::RedisQueue;
use crate::task::registry::TaskRegistry;
use crate::task::sled_queue::SledQueue;
use crate::worker::pool::WorkerPool;

/// Store and queue for the configured backend.
pub struct Backend {
    pub store: Arc<dyn KeyValueStore>,
    pub queue: Arc<dyn TaskQueue>,
}

pub async fn connect_backend(config: &Config) -> Result<Backend, StoreError> {
    match config.store_backend {
        StoreBackend::Redis => {
            log::info!("Connecting to Redis");
            let client = Client::open(config.redis_url.as_str())?;
            let connection = client.get_multiplexed_async_connection().await?;
            log::info!("Connected to Redis successfully");

            Ok(Backend {
                store: Arc::new(RedisStore::from_connection(connection.clone())),
                queue: Arc::new(RedisQueue::new(
                    connection,
                    &config.queue_name,
                    &config.consumer_id,
                )),
            })
        }
        StoreBackend::Sled => {
            log::info!("Opening sled store at {}", config.sled_path);
            let db = sled::open(&config.sled_path)?;

            Ok(Backend {
                store: Arc::new(SledStore::new(db.clone())?),
                queue: Arc::new(SledQueue::new(&db)?),
            })
        }
    }
}

pub fn build_coordinator(
    config: &Config,
    backend: &Backend,
    generator: Arc<dyn TextGenerator>,
) -> RequestCoordinator {
    RequestCoordinator::new(
        CacheService::new(backend.store.clone(), config.cache_ttl),
        SummaryExecutor::new(generator),
        TaskRegistry::new(
            backend.store.clone(),
            config.task_result_ttl,
            config.stale_task_after(),
        )
        .with_pending_timeout(config.task_pending_timeout),
        backend.queue.clone(),
    )
}

pub fn build_worker_pool(config: &Config, coordinator: RequestCoordinator) -> WorkerPool {
    WorkerPool::new(
        coordinator,
        &config.consumer_id,
        config.worker_concurrency,
        config.time_limits,
        config.poll_interval,
    )
}
