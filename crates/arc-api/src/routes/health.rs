//! Liveness endpoints

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Records currently held per collection; never triggers a fetch
    pub cached: BTreeMap<&'static str, usize>,
}

/// GET /health
///
/// Reports `shutting_down` once upstream clients have been closed.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    metrics::counter!("arc_companion_health_checks_total").increment(1);

    let cached = state
        .engine
        .cache_status()
        .slots
        .into_iter()
        .map(|slot| (slot.kind, slot.records))
        .collect();
    let status = if state.engine.is_closed() {
        "shutting_down"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        cached,
    })
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}
