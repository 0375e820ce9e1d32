//! Single-source fetch seam

use arc_proxy::{ProxyError, Resource, SourceClient};
use async_trait::async_trait;
use serde_json::Value;

/// Result of one upstream call. Failures are explicit here; the resolver
/// decides what they mean.
pub type FetchOutcome = Result<Vec<Value>, ProxyError>;

/// One upstream call for one resource, bounded by the implementor's timeout.
/// Implementations never retry.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, resource: Resource) -> FetchOutcome;

    /// Release transport resources. Must be idempotent.
    async fn close(&self) {}
}

#[async_trait]
impl SourceFetcher for SourceClient {
    async fn fetch(&self, resource: Resource) -> FetchOutcome {
        self.fetch_records(resource).await
    }

    async fn close(&self) {
        SourceClient::close(self).await
    }
}
