//! TTL cache store
//!
//! One slot per collection. A slot holds an immutable snapshot with an
//! expiry; snapshots are swapped whole, so readers never observe a partial
//! refresh.

mod catalog;
mod slot;

pub use catalog::{FeedCatalog, ItemCatalog, MapCatalog, QuestCatalog};
pub use slot::{CacheSlot, Snapshot};

use crate::config::CacheTtlConfig;
use crate::model::{EntityKind, FeedKind};

/// The engine's cache: an independent slot per entity kind and feed
pub struct CacheStore {
    pub items: CacheSlot<ItemCatalog>,
    pub quests: CacheSlot<QuestCatalog>,
    pub maps: CacheSlot<MapCatalog>,
    pub events: CacheSlot<FeedCatalog>,
    pub traders: CacheSlot<FeedCatalog>,
}

impl CacheStore {
    pub fn new(ttl: &CacheTtlConfig) -> Self {
        Self {
            items: CacheSlot::new(EntityKind::Items.as_str(), ttl.entity_ttl(EntityKind::Items)),
            quests: CacheSlot::new(EntityKind::Quests.as_str(), ttl.entity_ttl(EntityKind::Quests)),
            maps: CacheSlot::new(EntityKind::Maps.as_str(), ttl.entity_ttl(EntityKind::Maps)),
            events: CacheSlot::new(FeedKind::Events.as_str(), ttl.feed_ttl(FeedKind::Events)),
            traders: CacheSlot::new(FeedKind::Traders.as_str(), ttl.feed_ttl(FeedKind::Traders)),
        }
    }

    pub fn feed(&self, kind: FeedKind) -> &CacheSlot<FeedCatalog> {
        match kind {
            FeedKind::Events => &self.events,
            FeedKind::Traders => &self.traders,
        }
    }
}
