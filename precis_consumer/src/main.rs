mod error;

use error::{ConsumerError, ConsumerResult};
use precis_core::ai::handler::AI;
use precis_core::cache::redis_store::RedisStore;
use precis_core::config::{Config, StoreBackend};
use precis_core::dependencies::{Backend, build_coordinator, build_worker_pool};
use precis_core::task::queue::TaskQueue;
use precis_core::task::redis_queue::RedisQueue;
use redis::Client;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> ConsumerResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let consumer_id = config.consumer_id.clone();

    if config.store_backend != StoreBackend::Redis {
        return Err(ConsumerError::ConnectionFailed(
            "precis_consumer needs STORE_BACKEND=redis; the sled backend runs workers inside the server"
                .to_string(),
        ));
    }

    let ai = AI::new(config.require_openai_api_key()?).map_err(|e| {
        ConsumerError::ConnectionFailed(format!("Failed to create OpenAI client: {}", e))
    })?;

    log::info!("[{}] Starting Precis Consumer...", consumer_id);
    log::info!("[{}] Connecting to Redis", consumer_id);

    let redis_client = Client::open(config.redis_url.as_str())?;
    let redis_connection = redis_client.get_multiplexed_async_connection().await?;

    log::info!("[{}] Connected to Redis successfully", consumer_id);

    let backend = Backend {
        store: Arc::new(RedisStore::from_connection(redis_connection.clone())),
        queue: Arc::new(RedisQueue::new(
            redis_connection,
            &config.queue_name,
            &consumer_id,
        )),
    };

    // Messages reserved by a previous run of this consumer that never finished.
    let recovered = backend.queue.recover().await?;
    log::info!("[{}] Requeued {} unfinished messages", consumer_id, recovered);

    let coordinator = build_coordinator(&config, &backend, Arc::new(ai));
    let pool = build_worker_pool(&config, coordinator);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_consumer_id = consumer_id.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("[{}] Failed to listen for Ctrl-C: {}", signal_consumer_id, e);
            // Keep the sender alive so the workers keep running.
            std::future::pending::<()>().await;
        }
        log::info!("[{}] Shutting down, finishing in-flight tasks...", signal_consumer_id);
        let _ = shutdown_tx.send(true);
    });

    log::info!(
        "[{}] Starting {} workers on queue {}",
        consumer_id,
        config.worker_concurrency,
        config.queue_name
    );
    pool.run(shutdown_rx).await;

    log::info!("[{}] Consumer stopped", consumer_id);
    Ok(())
}
