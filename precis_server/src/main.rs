mod docs;
mod error;
mod info;
mod middlewares;
mod rate_limit;
mod router;
mod state;
mod summarize;
mod tasks;

use std::{net::SocketAddr, sync::Arc};

use dotenvy::dotenv;
use precis_core::{
    ai::handler::AI,
    config::Config,
    dependencies::{build_coordinator, build_worker_pool, connect_backend},
};
use rate_limit::limiter::RateLimiter;
use router::router;
use state::ServerState;
use tokio::sync::watch;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let ai = AI::new(config.require_openai_api_key()?)?;
    let backend = connect_backend(&config).await?;
    let coordinator = build_coordinator(&config, &backend, Arc::new(ai));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let workers = if config.embedded_workers {
        let recovered = backend.queue.recover().await?;
        log::info!("Requeued {} unfinished messages", recovered);
        log::info!("Starting {} embedded workers", config.worker_concurrency);
        build_worker_pool(&config, coordinator.clone()).spawn(shutdown_rx)
    } else {
        Vec::new()
    };

    let state = Arc::new(ServerState::from((
        coordinator,
        RateLimiter::new(config.rate_limit_requests, config.rate_limit_window),
        config.time_limits,
        config.max_text_length,
    )));

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server_domain).await?;
    log::info!("Listening on {}", config.server_domain);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Shutting down...");
    })
    .await?;

    let _ = shutdown_tx.send(true);
    for worker in workers {
        if let Err(e) = worker.await {
            log::error!("Worker panicked: {}", e);
        }
    }

    Ok(())
}
