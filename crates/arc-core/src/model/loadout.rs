//! Weapon and armor views derived from items, plus loadout results

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub weapon_type: String,
    pub rarity: Option<String>,
    pub base_damage: f64,
    /// Rounds per minute
    pub fire_rate: f64,
    /// Percentage
    pub accuracy: f64,
    pub recoil: f64,
    pub range: f64,
    pub magazine_size: u32,
    /// Seconds
    pub reload_time: f64,
    pub mod_slots: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorPiece {
    pub id: String,
    pub name: String,
    pub slot: String,
    pub rarity: Option<String>,
    pub armor_value: f64,
    pub durability: f64,
    pub weight: f64,
    pub special_effects: Vec<String>,
    pub image_url: Option<String>,
}

/// A weapon paired with its computed DPS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedWeapon {
    #[serde(flatten)]
    pub weapon: Weapon,
    pub calculated_dps: f64,
}

/// Seconds needed to deal the given amount of damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeToKill {
    pub no_armor: f64,
    pub light_armor: f64,
    pub heavy_armor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpsBreakdown {
    pub weapon_id: String,
    pub base_dps: f64,
    pub modded_dps: f64,
    pub effective_dps: f64,
    pub time_to_kill: TimeToKill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadoutStats {
    pub total_dps: f64,
    pub total_armor: f64,
    pub total_weight: f64,
    /// Percentage, capped at 30
    pub movement_penalty: f64,
    pub survivability_score: f64,
}

/// Weapons bucketed by DPS rank percentile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct TierList {
    pub s: Vec<RankedWeapon>,
    pub a: Vec<RankedWeapon>,
    pub b: Vec<RankedWeapon>,
    pub c: Vec<RankedWeapon>,
    pub d: Vec<RankedWeapon>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDetail {
    pub weapon: Weapon,
    pub dps_calculation: DpsBreakdown,
}

/// The pieces a loadout resolved to and their combined stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadoutSummary {
    pub weapons: Vec<Weapon>,
    pub armor: Vec<ArmorPiece>,
    pub stats: LoadoutStats,
}
