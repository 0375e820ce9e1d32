//! Cached collections and their derived indices

use serde_json::Value;
use std::collections::BTreeSet;

use crate::model::{GameMap, Item, Quest};

/// Item snapshot with category and rarity indices
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    pub items: Vec<Item>,
    pub categories: BTreeSet<String>,
    pub rarities: BTreeSet<String>,
}

impl ItemCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        let categories = items
            .iter()
            .map(|i| i.category.clone())
            .filter(|c| !c.is_empty())
            .collect();
        let rarities = items.iter().filter_map(|i| i.rarity.clone()).collect();
        Self {
            items,
            categories,
            rarities,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Quest snapshot with giver, type and location indices
#[derive(Debug, Clone, Default)]
pub struct QuestCatalog {
    pub quests: Vec<Quest>,
    pub givers: BTreeSet<String>,
    pub types: BTreeSet<String>,
    pub locations: BTreeSet<String>,
}

impl QuestCatalog {
    pub fn new(quests: Vec<Quest>) -> Self {
        let givers = quests.iter().filter_map(|q| q.giver.clone()).collect();
        let types = quests.iter().filter_map(|q| q.quest_type.clone()).collect();
        let locations = quests.iter().filter_map(|q| q.location.clone()).collect();
        Self {
            quests,
            givers,
            types,
            locations,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapCatalog {
    pub maps: Vec<GameMap>,
}

impl MapCatalog {
    pub fn new(maps: Vec<GameMap>) -> Self {
        Self { maps }
    }

    pub fn get(&self, id: &str) -> Option<&GameMap> {
        self.maps.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

/// Raw passthrough records
#[derive(Debug, Clone, Default)]
pub struct FeedCatalog {
    pub records: Vec<Value>,
}

impl FeedCatalog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
