//! Cross-collection lookups: related items, quest graphs and map contents

use std::collections::HashSet;

use crate::model::{GameMap, Item, MapMarker, MarkerType, Quest, QuestChain, RequiredItem};

const SAME_CATEGORY: u32 = 2;
const SAME_SUBCATEGORY: u32 = 1;
const SAME_RARITY: u32 = 1;
const SHARED_QUEST: u32 = 3;

fn both_equal(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

fn relatedness(item: &Item, other: &Item) -> u32 {
    let mut score = 0;
    if other.category == item.category {
        score += SAME_CATEGORY;
    }
    if both_equal(&other.subcategory, &item.subcategory) {
        score += SAME_SUBCATEGORY;
    }
    if both_equal(&other.rarity, &item.rarity) {
        score += SAME_RARITY;
    }
    if !other.quest_requirements.is_disjoint(&item.quest_requirements) {
        score += SHARED_QUEST;
    }
    score
}

/// Items resembling `item`, best first. Items scoring zero are left out;
/// equal scores keep collection order.
pub fn related_items(item: &Item, items: &[Item], limit: usize) -> Vec<Item> {
    let mut scored: Vec<(u32, &Item)> = items
        .iter()
        .filter(|other| other.id != item.id)
        .map(|other| (relatedness(item, other), other))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, other)| other.clone())
        .collect()
}

/// Resolve a quest's required items. Unknown item ids are skipped.
pub fn quest_requirements(quest: &Quest, items: &[Item]) -> Vec<RequiredItem> {
    quest
        .required_items
        .iter()
        .filter_map(|required| {
            let item = items.iter().find(|i| i.id == required.item_id)?;
            Some(RequiredItem {
                item: item.clone(),
                count: required.count,
            })
        })
        .collect()
}

/// Prerequisites that exist, in declared order, and every quest that lists
/// this one as a prerequisite
pub fn quest_chain(quest: &Quest, quests: &[Quest]) -> QuestChain {
    let prerequisites = quest
        .prerequisites
        .iter()
        .filter_map(|id| quests.iter().find(|q| &q.id == id).cloned())
        .collect();
    let follow_ups = quests
        .iter()
        .filter(|q| q.prerequisites.contains(&quest.id))
        .cloned()
        .collect();

    QuestChain {
        quest: quest.clone(),
        prerequisites,
        follow_ups,
    }
}

/// Markers followed by extractions, optionally restricted to one type
pub fn map_markers(map: &GameMap, marker_type: Option<MarkerType>) -> Vec<MapMarker> {
    map.markers
        .iter()
        .chain(&map.extractions)
        .filter(|m| marker_type.is_none_or(|t| m.marker_type == t))
        .cloned()
        .collect()
}

pub fn map_loot(map: &GameMap) -> Vec<MapMarker> {
    map.markers
        .iter()
        .filter(|m| m.marker_type.is_loot_location())
        .cloned()
        .collect()
}

/// Quests located on the map (by map name), then quests referenced by its
/// markers that were not already listed
pub fn map_quests(map: &GameMap, quests: &[Quest]) -> Vec<Quest> {
    let mut found: Vec<Quest> = quests
        .iter()
        .filter(|q| q.location.as_deref() == Some(map.name.as_str()))
        .cloned()
        .collect();
    let mut seen: HashSet<String> = found.iter().map(|q| q.id.clone()).collect();

    for id in map.markers.iter().flat_map(|m| &m.quests) {
        if seen.contains(id) {
            continue;
        }
        if let Some(quest) = quests.iter().find(|q| &q.id == id) {
            seen.insert(id.clone());
            found.push(quest.clone());
        }
    }

    found
}
