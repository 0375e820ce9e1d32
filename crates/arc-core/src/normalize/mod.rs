//! Normalization of heterogeneous upstream records
//!
//! Every upstream source names its fields differently. Each canonical field
//! is resolved through an ordered alias list; the first alias that is present
//! wins. A key counts as present when its value is neither `null` nor an empty
//! string. Normalization never fails: missing or malformed fields degrade to
//! `None` or an empty collection.

mod item;
mod map;
mod quest;

pub use item::normalize_item;
pub use map::normalize_map;
pub use quest::normalize_quest;

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::model::{GameMap, Item, Quest, UNKNOWN_ID};

/// A raw upstream record; only JSON objects reach the normalizer
pub type RawRecord = Map<String, Value>;

/// Ordered alias list for one canonical field
pub type Aliases = &'static [&'static str];

pub const ID: Aliases = &["id", "_id", "slug"];
pub const NAME: Aliases = &["name"];
pub const DESCRIPTION: Aliases = &["description", "desc"];
pub const IMAGE: Aliases = &["image", "icon", "image_url"];

pub const DEFAULT_NAME: &str = "Unknown";

/// Keep only JSON objects from an upstream batch.
///
/// Returns the records and the number of entries dropped.
pub fn retain_records(values: Vec<Value>) -> (Vec<RawRecord>, usize) {
    let total = values.len();
    let records: Vec<RawRecord> = values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    let dropped = total - records.len();
    if dropped > 0 {
        debug!("Dropped {} malformed records out of {}", dropped, total);
    }
    (records, dropped)
}

pub fn normalize_items(records: &[RawRecord]) -> Vec<Item> {
    let items: Vec<Item> = records.iter().map(normalize_item).collect();
    warn_on_sentinel_ids("items", items.iter().map(|i| i.id.as_str()));
    items
}

pub fn normalize_quests(records: &[RawRecord]) -> Vec<Quest> {
    let quests: Vec<Quest> = records.iter().map(normalize_quest).collect();
    warn_on_sentinel_ids("quests", quests.iter().map(|q| q.id.as_str()));
    quests
}

pub fn normalize_maps(records: &[RawRecord]) -> Vec<GameMap> {
    let maps: Vec<GameMap> = records.iter().map(normalize_map).collect();
    warn_on_sentinel_ids("maps", maps.iter().map(|m| m.id.as_str()));
    maps
}

/// Records without any id alias share the sentinel id, which makes lookups
/// by id ambiguous. This is kept as-is and only reported.
fn warn_on_sentinel_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) {
    let count = ids.filter(|id| *id == UNKNOWN_ID).count();
    if count > 1 {
        warn!(
            "{} {} records have no id and share the \"{}\" sentinel",
            count, kind, UNKNOWN_ID
        );
    }
}

/// Read-only view over a raw record with alias-aware accessors
#[derive(Clone, Copy)]
pub(crate) struct Fields<'a>(&'a RawRecord);

impl<'a> Fields<'a> {
    pub(crate) fn new(record: &'a RawRecord) -> Self {
        Self(record)
    }

    /// First present value among the aliases
    pub(crate) fn lookup(&self, aliases: Aliases) -> Option<&'a Value> {
        aliases.iter().find_map(|key| {
            self.0.get(*key).filter(|v| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
        })
    }

    pub(crate) fn string(&self, aliases: Aliases) -> Option<String> {
        self.lookup(aliases).and_then(value_to_string)
    }

    pub(crate) fn id(&self) -> String {
        self.string(ID).unwrap_or_else(|| UNKNOWN_ID.to_string())
    }

    pub(crate) fn name(&self) -> String {
        self.string(NAME).unwrap_or_else(|| DEFAULT_NAME.to_string())
    }

    pub(crate) fn f64(&self, aliases: Aliases) -> Option<f64> {
        self.lookup(aliases).and_then(value_to_f64)
    }

    pub(crate) fn i64(&self, aliases: Aliases) -> Option<i64> {
        self.lookup(aliases).and_then(value_to_i64)
    }

    pub(crate) fn u32(&self, aliases: Aliases) -> Option<u32> {
        self.i64(aliases).and_then(|n| u32::try_from(n).ok())
    }

    /// Nested object; a present alias holding a non-object yields `None`
    pub(crate) fn object(&self, aliases: Aliases) -> Option<Fields<'a>> {
        match self.lookup(aliases) {
            Some(Value::Object(map)) => Some(Fields(map)),
            _ => None,
        }
    }

    pub(crate) fn array(&self, aliases: Aliases) -> &'a [Value] {
        match self.lookup(aliases) {
            Some(Value::Array(values)) => values,
            _ => &[],
        }
    }

    /// Ordered list of references given as strings or objects with an id/name
    pub(crate) fn reference_list(&self, aliases: Aliases) -> Vec<String> {
        self.array(aliases)
            .iter()
            .filter_map(|v| match v {
                Value::Object(map) => {
                    let fields = Fields(map);
                    fields.string(ID).or_else(|| fields.string(NAME))
                }
                other => value_to_string(other),
            })
            .collect()
    }

    pub(crate) fn reference_set(&self, aliases: Aliases) -> BTreeSet<String> {
        self.reference_list(aliases).into_iter().collect()
    }

    /// Name-to-count mapping given either as an object or a list of
    /// `{name, count}` entries
    pub(crate) fn count_map(&self, aliases: Aliases) -> BTreeMap<String, u32> {
        match self.lookup(aliases) {
            Some(Value::Object(map)) => counts_from_object(map),
            Some(Value::Array(entries)) => counts_from_entries(entries),
            _ => BTreeMap::new(),
        }
    }

    pub(crate) fn raw(&self) -> &'a RawRecord {
        self.0
    }
}

const ENTRY_NAME: Aliases = &["name", "item", "item_id", "id"];
const ENTRY_COUNT: Aliases = &["count", "quantity", "amount"];

pub(crate) fn counts_from_object(map: &RawRecord) -> BTreeMap<String, u32> {
    map.iter()
        .filter_map(|(name, v)| {
            let count = value_to_i64(v).and_then(|n| u32::try_from(n).ok())?;
            Some((name.clone(), count))
        })
        .collect()
}

fn counts_from_entries(entries: &[Value]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        let Value::Object(map) = entry else { continue };
        let fields = Fields(map);
        let Some(name) = fields.string(ENTRY_NAME) else {
            continue;
        };
        let count = fields.u32(ENTRY_COUNT).unwrap_or(1);
        let total = counts.entry(name).or_insert(0u32);
        *total = total.saturating_add(count);
    }
    counts
}

pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Integer view of a number or numeric string. Fractions round half away
/// from zero; out-of-range values saturate.
pub(crate) fn value_to_i64(value: &Value) -> Option<i64> {
    let exact = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    exact.or_else(|| value_to_f64(value).map(|f| f.round() as i64))
}

#[cfg(test)]
pub(crate) fn record(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}
