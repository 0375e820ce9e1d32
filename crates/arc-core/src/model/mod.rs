//! Canonical data model
//!
//! Entities are immutable once normalized. A refresh replaces a whole
//! collection, it never patches individual entities.

mod item;
mod loadout;
mod map;
mod quest;

pub use item::{CraftingRecipe, Item, ItemStats, RecycleYield};
pub use loadout::{
    ArmorPiece, DpsBreakdown, LoadoutStats, LoadoutSummary, RankedWeapon, TierList, TimeToKill, Weapon,
    WeaponDetail,
};
pub use map::{GameMap, MapMarker, MapZone, MarkerType, ZonePoint};
pub use quest::{ItemCount, Quest, QuestChain, QuestObjective, QuestReward, RequiredItem};

use arc_proxy::Resource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel id assigned to records that carry none of the id aliases
pub const UNKNOWN_ID: &str = "unknown";

/// Normalized entity collections, each with its own cache slot and TTL
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Items,
    Quests,
    Maps,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Items, EntityKind::Quests, EntityKind::Maps];

    pub fn resource(&self) -> Resource {
        match self {
            EntityKind::Items => Resource::Items,
            EntityKind::Quests => Resource::Quests,
            EntityKind::Maps => Resource::Maps,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.resource().as_str()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Passthrough collections served as raw upstream JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Events,
    Traders,
}

impl FeedKind {
    pub const ALL: [FeedKind; 2] = [FeedKind::Events, FeedKind::Traders];

    pub fn resource(&self) -> Resource {
        match self {
            FeedKind::Events => Resource::Events,
            FeedKind::Traders => Resource::Traders,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.resource().as_str()
    }
}
