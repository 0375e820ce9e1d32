//! Core error types

use thiserror::Error;

/// Errors raised while building the engine.
///
/// Queries never fail on upstream trouble; absent entities are `None`.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Proxy error: {0}")]
    Proxy(#[from] arc_proxy::ProxyError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
