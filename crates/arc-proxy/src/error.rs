//! Proxy error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned error: {status} - {message}")]
    UpstreamError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid source URL: {0}")]
    InvalidUrl(String),

    #[error("Client closed")]
    Closed,
}
