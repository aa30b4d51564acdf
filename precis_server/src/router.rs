use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use crate::{
    docs::{dto::ApiDoc, handler::api_docs},
    info::handler::{health, info, stats},
    middlewares::handler::{process_time, rate_limit},
    state::ServerState,
    summarize::handler::{summarize, summarize_async},
    tasks::handler::get_task_result,
};

pub const API_BASE: &str = "/api/v1";

pub fn router(state: Arc<ServerState>) -> Router {
    let doc = ApiDoc::openapi();

    let limited_router = Router::new()
        .route("/summarize", post(summarize))
        .route("/summarize/async", post(summarize_async))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let api_router = Router::new()
        .merge(limited_router)
        .route("/tasks/{task_id}", get(get_task_result))
        .route("/health", get(health))
        .route("/stats", get(stats));

    Router::new()
        .merge(Redoc::with_url("/redoc", doc))
        .nest(API_BASE, api_router)
        .route("/", get(info))
        .route("/docs", get(api_docs))
        .layer(middleware::from_fn(process_time))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
