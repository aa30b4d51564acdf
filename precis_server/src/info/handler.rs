use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use chrono::Utc;

use super::dto::{HealthCheck, Info, Stats, VERSION};
use crate::{error::ErrorServer, router::API_BASE, state::ServerState};

#[utoipa::path(
    get,
    path = "/",
    description = "Service information",
    responses((status = 200, description = "Success", body = Info))
)]
pub async fn info() -> Json<Info> {
    Json(Info {
        service: "Precis Text Summarizer".to_string(),
        version: VERSION.to_string(),
        status: "running".to_string(),
        docs_url: "/redoc".to_string(),
        api_base: API_BASE.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    description = "Liveness of the backing store",
    responses((status = 200, description = "Success", body = HealthCheck))
)]
pub async fn health(State(server_state): State<Arc<ServerState>>) -> Json<HealthCheck> {
    let healthy = server_state.coordinator().cache_health().await;

    Json(HealthCheck {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: VERSION.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/stats",
    description = "Backing store statistics",
    responses(
        (status = 200, description = "Success", body = Stats),
        (status = 500, description = "Failed to get stats"),
    )
)]
pub async fn stats(State(server_state): State<Arc<ServerState>>) -> Result<Json<Stats>, ErrorServer> {
    let stats = server_state
        .coordinator()
        .cache_stats()
        .await
        .ok_or_else(|| ErrorServer::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get stats"))?;

    Ok(Json(Stats {
        cache_hit_ratio: stats.hit_ratio(),
        connected_clients: stats.connected_clients,
        used_memory: stats.used_memory,
        keyspace_hits: stats.keyspace_hits,
        keyspace_misses: stats.keyspace_misses,
    }))
}
