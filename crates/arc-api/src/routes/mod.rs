//! API routes

mod events;
mod extract;
mod health;
mod items;
mod loadouts;
mod maps;
pub mod metrics;
mod quests;
mod status;
pub mod types;

use axum::Router;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(items::routes())
        .merge(quests::routes())
        .merge(maps::routes())
        .merge(loadouts::routes())
        .merge(events::routes())
        .merge(status::routes())
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
