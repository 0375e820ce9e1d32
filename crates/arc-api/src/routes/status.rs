//! Statistics and cache management routes

use arc_core::{CacheStatus, EngineStats};
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tracing::info;

use crate::state::AppState;

/// GET /api/stats
async fn stats(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.stats().await)
}

/// GET /api/cache/status
async fn cache_status(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(state.engine.cache_status())
}

/// POST /api/cache/refresh
async fn refresh(State(state): State<AppState>) -> Json<CacheStatus> {
    info!("Refreshing all cached collections");
    Json(state.engine.refresh_all().await)
}

/// Create status routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(stats))
        .route("/api/cache/status", get(cache_status))
        .route("/api/cache/refresh", post(refresh))
}
