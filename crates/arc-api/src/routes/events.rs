//! Passthrough feed routes

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /api/events
async fn events(State(state): State<AppState>) -> Json<Value> {
    let feed = state.engine.events().await;
    Json(json!({ "events": feed.records }))
}

/// GET /api/events/traders
async fn traders(State(state): State<AppState>) -> Json<Value> {
    let feed = state.engine.traders().await;
    Json(json!({ "traders": feed.records }))
}

/// Create feed routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(events))
        .route("/api/events/traders", get(traders))
}
