//! Filtering and pagination over cached collections

use serde::Deserialize;

use crate::model::{Item, Quest};

/// Item search criteria. Every supplied criterion must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFilter {
    /// Case-insensitive substring of name or description
    pub text: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub rarity: Option<String>,
    /// Trader that must carry the item
    pub trader: Option<String>,
    /// Inclusive bounds; items with no known value never match a bound
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        let needle = self.text.as_deref().map(str::to_lowercase);
        self.matches_with(item, needle.as_deref())
    }

    fn matches_with(&self, item: &Item, needle: Option<&str>) -> bool {
        needle.is_none_or(|n| item.matches_text(n))
            && equals(&self.category, Some(&item.category))
            && equals(&self.subcategory, item.subcategory.as_ref())
            && equals(&self.rarity, item.rarity.as_ref())
            && self.trader.as_ref().is_none_or(|t| item.traders.contains(t))
            && within(item.value, self.min_value, self.max_value)
    }

    /// Matching items in collection order
    pub fn apply<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        let needle = self.text.as_deref().map(str::to_lowercase);
        items
            .iter()
            .filter(|item| self.matches_with(item, needle.as_deref()))
            .collect()
    }
}

/// Quest search criteria. Every supplied criterion must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestFilter {
    pub text: Option<String>,
    pub giver: Option<String>,
    #[serde(rename = "type")]
    pub quest_type: Option<String>,
    pub location: Option<String>,
}

impl QuestFilter {
    pub fn apply<'a>(&self, quests: &'a [Quest]) -> Vec<&'a Quest> {
        let needle = self.text.as_deref().map(str::to_lowercase);
        quests
            .iter()
            .filter(|quest| {
                needle.as_deref().is_none_or(|n| quest.matches_text(n))
                    && equals(&self.giver, quest.giver.as_ref())
                    && equals(&self.quest_type, quest.quest_type.as_ref())
                    && equals(&self.location, quest.location.as_ref())
            })
            .collect()
    }
}

/// An unset criterion matches anything; a set one needs an equal value
fn equals(wanted: &Option<String>, actual: Option<&String>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual == Some(wanted),
    }
}

fn within(value: Option<i64>, min: Option<i64>, max: Option<i64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}

/// Slice `[offset, offset + limit)` out of the matches.
///
/// Returns the page and the number of matches before slicing.
pub fn paginate<T: Clone>(matches: Vec<&T>, limit: usize, offset: usize) -> (Vec<T>, usize) {
    let total = matches.len();
    let page = matches
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    (page, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_items, normalize_quests, record};
    use serde_json::json;

    fn items() -> Vec<Item> {
        normalize_items(&[
            record(json!({"id": "a", "name": "Anvil Rifle", "category": "weapon", "value": 100, "traders": ["Tian Wen"]})),
            record(json!({"id": "b", "name": "Light Vest", "category": "armor", "value": 100, "rarity": "common"})),
            record(json!({"id": "c", "name": "Fuse", "description": "Powers a rifle scope", "category": "material"})),
            record(json!({"id": "d", "name": "Freebie", "category": "weapon", "value": 0, "type": "pistol"})),
        ])
    }

    fn ids(items: &[&Item]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_filter_conjunction() {
        let items = items();
        let filter = ItemFilter {
            category: Some("weapon".to_string()),
            min_value: Some(50),
            ..Default::default()
        };
        let matches = filter.apply(&items);
        assert_eq!(ids(&matches), vec!["a"]);

        let (page, total) = paginate(matches, 50, 0);
        assert_eq!(total, 1);
        assert_eq!(page[0].id, "a");
    }

    #[test]
    fn test_text_matches_name_or_description() {
        let items = items();
        let filter = ItemFilter {
            text: Some("RIFLE".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&items)), vec!["a", "c"]);
    }

    #[test]
    fn test_value_bounds_exclude_unknown_values() {
        let items = items();
        let filter = ItemFilter {
            max_value: Some(100),
            ..Default::default()
        };
        // "c" has no value and is excluded; "d" is worth 0 and kept
        assert_eq!(ids(&filter.apply(&items)), vec!["a", "b", "d"]);

        let unbounded = ItemFilter::default();
        assert_eq!(unbounded.apply(&items).len(), 4);
    }

    #[test]
    fn test_exact_field_filters() {
        let items = items();
        let by_trader = ItemFilter {
            trader: Some("Tian Wen".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&by_trader.apply(&items)), vec!["a"]);

        let by_subcategory = ItemFilter {
            subcategory: Some("pistol".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&by_subcategory.apply(&items)), vec!["d"]);

        let by_rarity = ItemFilter {
            rarity: Some("Common".to_string()),
            ..Default::default()
        };
        assert!(by_rarity.apply(&items).is_empty());
        assert!(!by_rarity.matches(&items[1]));
    }

    #[test]
    fn test_pagination_law() {
        let items = items();
        let filter = ItemFilter::default();

        for limit in 1..=5 {
            for offset in 0..=6 {
                let (page, total) = paginate(filter.apply(&items), limit, offset);
                assert_eq!(total, 4);
                assert_eq!(page.len(), limit.min(total.saturating_sub(offset)));
            }
        }
    }

    #[test]
    fn test_offset_past_end() {
        let items = items();
        let (page, total) = paginate(ItemFilter::default().apply(&items), 10, 99);
        assert!(page.is_empty());
        assert_eq!(total, 4);
    }

    #[test]
    fn test_quest_filter() {
        let quests = normalize_quests(&[
            record(json!({"id": "q1", "name": "Power Outage", "giver": "Shani", "type": "main", "location": "Dam"})),
            record(json!({"id": "q2", "name": "Clearer Skies", "giver": "Shani", "type": "side"})),
            record(json!({"id": "q3", "name": "A Bad Feeling", "description": "Something about the power grid", "giver": "Celeste"})),
        ]);

        let by_giver = QuestFilter {
            giver: Some("Shani".to_string()),
            ..Default::default()
        };
        assert_eq!(by_giver.apply(&quests).len(), 2);

        let text = QuestFilter {
            text: Some("power".to_string()),
            ..Default::default()
        };
        let found: Vec<&str> = text.apply(&quests).iter().map(|q| q.id.as_str()).collect();
        assert_eq!(found, vec!["q1", "q3"]);

        let combined = QuestFilter {
            giver: Some("Shani".to_string()),
            quest_type: Some("main".to_string()),
            location: Some("Dam".to_string()),
            ..Default::default()
        };
        assert_eq!(combined.apply(&quests).len(), 1);
    }
}
