//! Item entity

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Combat and wear statistics; every field is optional upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    pub damage: Option<f64>,
    pub fire_rate: Option<f64>,
    pub accuracy: Option<f64>,
    pub range: Option<f64>,
    pub armor: Option<f64>,
    pub durability: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftingRecipe {
    /// Ingredient name to required count
    pub ingredients: BTreeMap<String, u32>,
    /// Always at least 1
    pub result_quantity: u32,
    /// Seconds
    pub crafting_time: Option<u32>,
    pub required_hideout_level: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecycleYield {
    pub materials: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub rarity: Option<String>,
    pub weight: Option<f64>,
    pub value: Option<i64>,
    pub stats: Option<ItemStats>,
    pub crafting: Option<CraftingRecipe>,
    pub recycle: Option<RecycleYield>,
    pub traders: BTreeSet<String>,
    pub quest_requirements: BTreeSet<String>,
    pub image_url: Option<String>,
}

impl Item {
    /// Case-insensitive substring match against name or description.
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}
