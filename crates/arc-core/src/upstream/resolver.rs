//! Priority-ordered fallback across upstream sources
//!
//! The resolver asks each source configured for a resource in turn and stops
//! at the first one that returns at least one well-formed record. Results
//! from different sources are never merged.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_proxy::{Resource, SourceClient, SourceClientConfig};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::fetcher::SourceFetcher;
use crate::config::{FetchConfig, SourceConfig};
use crate::error::CoreError;
use crate::normalize::{RawRecord, retain_records};

/// A source together with the fetcher that talks to it
#[derive(Clone)]
pub struct RegisteredSource {
    pub config: SourceConfig,
    pub fetcher: Arc<dyn SourceFetcher>,
}

impl std::fmt::Debug for RegisteredSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Records returned by the first source that had any
#[derive(Debug, Clone)]
pub struct Resolved {
    pub source: String,
    pub records: Vec<RawRecord>,
}

/// Outcome history for one source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceHealth {
    pub name: String,
    pub display_name: String,
    pub healthy: bool,
    pub last_check: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

pub struct FallbackResolver {
    /// Enabled sources, sorted by priority
    sources: Vec<RegisteredSource>,
    health: RwLock<HashMap<String, SourceHealth>>,
    closed: AtomicBool,
}

impl FallbackResolver {
    /// Create a resolver over already-built fetchers.
    ///
    /// Disabled sources are dropped. The rest are ordered by priority; ties
    /// keep their declaration order.
    pub fn new(sources: Vec<RegisteredSource>) -> Self {
        let mut sources: Vec<RegisteredSource> =
            sources.into_iter().filter(|s| s.config.enabled).collect();
        sources.sort_by_key(|s| s.config.priority);

        let health = sources
            .iter()
            .map(|s| {
                (
                    s.config.name.clone(),
                    SourceHealth {
                        name: s.config.name.clone(),
                        display_name: s.config.display_name().to_string(),
                        healthy: true, // Assume healthy until proven otherwise
                        last_check: None,
                        last_error: None,
                        consecutive_failures: 0,
                    },
                )
            })
            .collect();

        for source in &sources {
            info!(
                "Registered source: {} -> {} (priority: {})",
                source.config.name, source.config.url, source.config.priority
            );
        }

        Self {
            sources,
            health: RwLock::new(health),
            closed: AtomicBool::new(false),
        }
    }

    /// Build HTTP-backed sources from configuration
    pub fn from_config(configs: &[SourceConfig], fetch: &FetchConfig) -> Result<Self, CoreError> {
        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(configs.len());

        for config in configs {
            if !seen.insert(config.name.as_str()) {
                return Err(CoreError::InvalidConfig(format!(
                    "duplicate source name '{}'",
                    config.name
                )));
            }

            if !config.enabled {
                debug!("Skipping disabled source: {}", config.name);
                continue;
            }

            let client = SourceClient::new(SourceClientConfig {
                name: config.name.clone(),
                url: config.url.clone(),
                timeout: fetch.timeout(),
                page_limit: config.page_limit,
            })?;

            sources.push(RegisteredSource {
                config: config.clone(),
                fetcher: Arc::new(client),
            });
        }

        Ok(Self::new(sources))
    }

    /// Names of enabled sources in fallback order
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.config.name.clone()).collect()
    }

    /// Health of every enabled source in fallback order
    pub fn health(&self) -> Vec<SourceHealth> {
        let health = self.health.read();
        self.sources
            .iter()
            .filter_map(|s| health.get(&s.config.name).cloned())
            .collect()
    }

    /// Fetch a resource from the first source that yields records.
    ///
    /// Returns `None` when every source failed or came back empty. The two
    /// cases are deliberately indistinguishable to the caller.
    pub async fn resolve(&self, resource: Resource) -> Option<Resolved> {
        if self.closed.load(Ordering::Acquire) {
            debug!("Resolver closed, not fetching {}", resource);
            return None;
        }

        for source in self.sources.iter().filter(|s| s.config.serves(resource)) {
            let name = &source.config.name;

            match source.fetcher.fetch(resource).await {
                Ok(values) => {
                    self.mark_healthy(name);
                    let (records, _) = retain_records(values);
                    if !records.is_empty() {
                        info!("Fetched {} {} records from {}", records.len(), resource, name);
                        return Some(Resolved {
                            source: name.clone(),
                            records,
                        });
                    }
                    debug!("Source {} returned no {} records, trying next", name, resource);
                }
                Err(e) => {
                    // A failed source is treated exactly like an empty one
                    warn!("Source {} failed to fetch {}: {}", name, resource, e);
                    self.mark_unhealthy(name, &e.to_string());
                }
            }
        }

        warn!("No source returned {} records", resource);
        None
    }

    /// Close every fetcher. Later calls are no-ops.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        for source in &self.sources {
            source.fetcher.close().await;
        }
        info!("Closed {} sources", self.sources.len());
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn mark_healthy(&self, name: &str) {
        let mut health = self.health.write();
        if let Some(state) = health.get_mut(name) {
            if !state.healthy {
                info!("Source {} recovered", name);
            }
            state.healthy = true;
            state.last_check = Some(Utc::now());
            state.last_error = None;
            state.consecutive_failures = 0;
        }
    }

    fn mark_unhealthy(&self, name: &str, error: &str) {
        let mut health = self.health.write();
        if let Some(state) = health.get_mut(name) {
            state.healthy = false;
            state.last_check = Some(Utc::now());
            state.last_error = Some(error.to_string());
            state.consecutive_failures += 1;
            debug!(
                "Marked source {} as unhealthy: {} (failures: {})",
                name, error, state.consecutive_failures
            );
        }
    }
}
