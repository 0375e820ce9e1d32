//! Upstream access with priority fallback
//!
//! This module provides:
//! - The `SourceFetcher` seam over a single upstream call
//! - The `FallbackResolver` that walks the sources configured for a resource
//!   in priority order and returns the first non-empty result

mod fetcher;
mod resolver;

pub use fetcher::{FetchOutcome, SourceFetcher};
pub use resolver::{FallbackResolver, RegisteredSource, Resolved, SourceHealth};

#[cfg(test)]
pub(crate) use resolver::testing;
