//! Arc Companion Core
//!
//! This crate provides the aggregation engine: upstream fallback, schema
//! normalization, the TTL cache and the views derived from cached items.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod upstream;

pub use arc_proxy::Resource;

pub use cache::{CacheStore, FeedCatalog, ItemCatalog, MapCatalog, QuestCatalog};
pub use config::{CacheTtlConfig, EngineConfig, FetchConfig, SourceConfig};
pub use engine::{AggregationEngine, CacheStatus, EngineStats, ItemFilter, QuestFilter, SlotStatus};
pub use error::CoreError;
pub use model::{EntityKind, FeedKind};
pub use upstream::{FallbackResolver, SourceFetcher, SourceHealth};
