//! Map entities

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Point-of-interest category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
    Extraction,
    Loot,
    Enemy,
    Quest,
    Trader,
    /// Also used for marker types this model does not know
    #[default]
    Landmark,
    Container,
    Spawn,
}

impl MarkerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerType::Extraction => "extraction",
            MarkerType::Loot => "loot",
            MarkerType::Enemy => "enemy",
            MarkerType::Quest => "quest",
            MarkerType::Trader => "trader",
            MarkerType::Landmark => "landmark",
            MarkerType::Container => "container",
            MarkerType::Spawn => "spawn",
        }
    }

    /// Parse a marker type, case-insensitively. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "extraction" | "extract" | "exit" => Some(MarkerType::Extraction),
            "loot" => Some(MarkerType::Loot),
            "enemy" => Some(MarkerType::Enemy),
            "quest" => Some(MarkerType::Quest),
            "trader" => Some(MarkerType::Trader),
            "landmark" => Some(MarkerType::Landmark),
            "container" => Some(MarkerType::Container),
            "spawn" => Some(MarkerType::Spawn),
            _ => None,
        }
    }

    /// Marker types that indicate where loot can be found
    pub fn is_loot_location(&self) -> bool {
        matches!(
            self,
            MarkerType::Loot | MarkerType::Container | MarkerType::Spawn
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub marker_type: MarkerType,
    pub x: f64,
    pub y: f64,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub items: BTreeSet<String>,
    pub quests: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZonePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapZone {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: String,
    pub bounds: Vec<ZonePoint>,
    pub threat_level: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub markers: Vec<MapMarker>,
    pub zones: Vec<MapZone>,
    /// Every marker here has type `extraction`
    pub extractions: Vec<MapMarker>,
}
