//! Quest normalization

use serde_json::Value;

use super::{Aliases, DESCRIPTION, Fields, IMAGE, RawRecord, value_to_string};
use crate::model::{ItemCount, Quest, QuestObjective, QuestReward};

const DEFAULT_OBJECTIVE_TYPE: &str = "other";

const GIVER: Aliases = &["giver", "trader", "npc"];
const QUEST_TYPE: Aliases = &["type", "quest_type", "category"];
const LEVEL: Aliases = &["level_requirement", "level", "min_level"];
const PREREQUISITES: Aliases = &["prerequisites", "requires", "required_quests"];
const OBJECTIVES: Aliases = &["objectives", "tasks"];
const REQUIRED_ITEMS: Aliases = &["required_items", "items_required", "requirements"];
const REWARDS: Aliases = &["rewards", "reward"];
const LOCATION: Aliases = &["location", "map"];

const OBJECTIVE_TEXT: Aliases = &["description", "text", "name"];
const OBJECTIVE_TYPE: Aliases = &["type", "kind"];
const OBJECTIVE_TARGET: Aliases = &["target"];
const OBJECTIVE_COUNT: Aliases = &["count", "amount", "quantity"];

const ITEM_REF: Aliases = &["item_id", "id", "item"];
const ITEM_COUNT: Aliases = &["count", "quantity", "amount"];

const EXPERIENCE: Aliases = &["experience", "xp"];
const CURRENCY: Aliases = &["currency", "money", "coins"];
const REWARD_ITEMS: Aliases = &["items"];
const REPUTATION: Aliases = &["reputation"];

/// Map one raw record to a [`Quest`]. Never fails.
pub fn normalize_quest(raw: &RawRecord) -> Quest {
    let fields = Fields::new(raw);

    Quest {
        id: fields.id(),
        name: fields.name(),
        description: fields.string(DESCRIPTION),
        giver: fields.string(GIVER),
        quest_type: fields.string(QUEST_TYPE),
        level_requirement: fields.u32(LEVEL),
        prerequisites: fields.reference_list(PREREQUISITES),
        objectives: fields
            .array(OBJECTIVES)
            .iter()
            .filter_map(objective)
            .collect(),
        required_items: item_counts(fields.array(REQUIRED_ITEMS)),
        rewards: fields.object(REWARDS).map(rewards),
        location: fields.string(LOCATION),
        image_url: fields.string(IMAGE),
    }
}

fn objective(value: &Value) -> Option<QuestObjective> {
    match value {
        Value::Object(map) => {
            let fields = Fields::new(map);
            Some(QuestObjective {
                description: fields.string(OBJECTIVE_TEXT).unwrap_or_default(),
                objective_type: fields
                    .string(OBJECTIVE_TYPE)
                    .unwrap_or_else(|| DEFAULT_OBJECTIVE_TYPE.to_string()),
                target: fields.string(OBJECTIVE_TARGET),
                count: fields.u32(OBJECTIVE_COUNT),
                location: fields.string(LOCATION),
            })
        }
        Value::String(text) if !text.trim().is_empty() => Some(QuestObjective {
            description: text.clone(),
            objective_type: DEFAULT_OBJECTIVE_TYPE.to_string(),
            target: None,
            count: None,
            location: None,
        }),
        _ => None,
    }
}

fn item_counts(values: &[Value]) -> Vec<ItemCount> {
    values
        .iter()
        .filter_map(|value| match value {
            Value::Object(map) => {
                let fields = Fields::new(map);
                Some(ItemCount {
                    item_id: fields.string(ITEM_REF)?,
                    count: fields.u32(ITEM_COUNT).unwrap_or(1),
                })
            }
            other => value_to_string(other).map(|item_id| ItemCount { item_id, count: 1 }),
        })
        .collect()
}

fn rewards(fields: Fields<'_>) -> QuestReward {
    QuestReward {
        experience: fields.i64(EXPERIENCE),
        currency: fields.i64(CURRENCY),
        items: item_counts(fields.array(REWARD_ITEMS)),
        reputation: fields.object(REPUTATION).map(|rep| {
            rep.raw()
                .iter()
                .filter_map(|(name, v)| super::value_to_i64(v).map(|n| (name.clone(), n)))
                .collect()
        }),
    }
}
