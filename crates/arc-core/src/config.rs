//! Shared configuration types for the aggregation engine
//!
//! File loading happens in the binary; these types describe the static
//! configuration object the engine is constructed with.

use arc_proxy::Resource;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::{EntityKind, FeedKind};

/// One upstream community API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Unique identifier for the source
    pub name: String,
    /// Display name for UI (defaults to name if not set)
    #[serde(default)]
    pub display_name: Option<String>,
    /// Base URL; resources are fetched from `{url}/{resource}`
    pub url: String,
    /// Fallback order (lower = tried first)
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Whether this source is used at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Resources this source serves; empty means all of them
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Optional `limit` query parameter
    #[serde(default)]
    pub page_limit: Option<u32>,
}

impl SourceConfig {
    /// Get the display name, falling back to name if not set
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Check whether this source should be asked for a resource
    pub fn serves(&self, resource: Resource) -> bool {
        self.resources.is_empty() || self.resources.contains(&resource)
    }
}

/// Time-to-live per collection, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheTtlConfig {
    #[serde(default = "default_entity_ttl")]
    pub items_ttl_secs: u64,
    #[serde(default = "default_entity_ttl")]
    pub quests_ttl_secs: u64,
    #[serde(default = "default_entity_ttl")]
    pub maps_ttl_secs: u64,
    #[serde(default = "default_events_ttl")]
    pub events_ttl_secs: u64,
    #[serde(default = "default_traders_ttl")]
    pub traders_ttl_secs: u64,
}

impl CacheTtlConfig {
    pub fn entity_ttl(&self, kind: EntityKind) -> Duration {
        Duration::from_secs(match kind {
            EntityKind::Items => self.items_ttl_secs,
            EntityKind::Quests => self.quests_ttl_secs,
            EntityKind::Maps => self.maps_ttl_secs,
        })
    }

    pub fn feed_ttl(&self, kind: FeedKind) -> Duration {
        Duration::from_secs(match kind {
            FeedKind::Events => self.events_ttl_secs,
            FeedKind::Traders => self.traders_ttl_secs,
        })
    }
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            items_ttl_secs: default_entity_ttl(),
            quests_ttl_secs: default_entity_ttl(),
            maps_ttl_secs: default_entity_ttl(),
            events_ttl_secs: default_events_ttl(),
            traders_ttl_secs: default_traders_ttl(),
        }
    }
}

/// Upstream request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Everything the engine needs, fixed at construction
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub sources: Vec<SourceConfig>,
    pub cache: CacheTtlConfig,
    pub fetch: FetchConfig,
}

pub fn default_priority() -> i32 {
    100
}

fn default_enabled() -> bool {
    true
}

fn default_entity_ttl() -> u64 {
    3600 // 1 hour
}

fn default_events_ttl() -> u64 {
    300 // 5 minutes
}

fn default_traders_ttl() -> u64 {
    600 // 10 minutes
}

fn default_timeout_secs() -> u64 {
    30
}
