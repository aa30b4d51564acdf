use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct Info {
    pub service: String,
    pub version: String,
    pub status: String,
    pub docs_url: String,
    pub api_base: String,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct HealthCheck {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct Stats {
    pub connected_clients: u64,
    pub used_memory: String,
    pub keyspace_hits: u64,
    pub keyspace_misses: u64,
    pub cache_hit_ratio: f64,
}
