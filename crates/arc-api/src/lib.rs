//! Arc Companion REST API
//!
//! This crate provides the Axum-based HTTP API that exposes the aggregation
//! engine's queries as JSON endpoints.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
