//! Prometheus exposition

use axum::{
    Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;

use crate::state::MetricsHandle;

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Stateless router so the endpoint can be mounted only when a recorder exists
pub fn routes(handle: Arc<MetricsHandle>) -> Router {
    Router::new()
        .route("/metrics", get(render))
        .with_state(handle)
}

async fn render(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        handle.render(),
    )
}
