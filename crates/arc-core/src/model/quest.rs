//! Quest entity

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestObjective {
    pub description: String,
    #[serde(rename = "type")]
    pub objective_type: String,
    pub target: Option<String>,
    pub count: Option<u32>,
    pub location: Option<String>,
}

/// An item reference with a quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCount {
    pub item_id: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestReward {
    pub experience: Option<i64>,
    pub currency: Option<i64>,
    pub items: Vec<ItemCount>,
    /// Faction or trader name to reputation delta
    pub reputation: Option<BTreeMap<String, i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub giver: Option<String>,
    #[serde(rename = "type")]
    pub quest_type: Option<String>,
    pub level_requirement: Option<u32>,
    /// Quest ids in upstream order; ids may refer to quests that do not exist
    pub prerequisites: Vec<String>,
    pub objectives: Vec<QuestObjective>,
    pub required_items: Vec<ItemCount>,
    pub rewards: Option<QuestReward>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

impl Quest {
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// A quest's required item resolved against the item collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredItem {
    pub item: super::Item,
    pub count: u32,
}

/// A quest with its resolved prerequisites and the quests that follow it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestChain {
    pub quest: Quest,
    pub prerequisites: Vec<Quest>,
    pub follow_ups: Vec<Quest>,
}
