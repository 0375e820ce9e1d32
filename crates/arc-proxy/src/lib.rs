//! Arc Companion Upstream Proxy
//!
//! This crate provides the client for communicating with upstream
//! community data APIs, handling timeouts and response envelope unwrapping.

pub mod client;
pub mod error;

pub use client::{Resource, SourceClient, SourceClientConfig, unwrap_records};
pub use error::ProxyError;
