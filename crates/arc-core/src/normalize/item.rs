//! Item normalization

use super::{Aliases, DESCRIPTION, Fields, IMAGE, RawRecord, counts_from_object};
use crate::model::{CraftingRecipe, Item, ItemStats, RecycleYield};

pub const DEFAULT_CATEGORY: &str = "misc";

const CATEGORY: Aliases = &["category"];
const SUBCATEGORY: Aliases = &["subcategory", "type"];
const RARITY: Aliases = &["rarity", "tier"];
const WEIGHT: Aliases = &["weight"];
const VALUE: Aliases = &["value", "price"];
const STATS: Aliases = &["stats"];
const CRAFTING: Aliases = &["crafting", "recipe"];
const RECYCLE: Aliases = &["recycle", "recycling"];
const TRADERS: Aliases = &["traders", "sold_by"];
const QUESTS: Aliases = &["quests", "quest_requirements"];

const STAT_DAMAGE: Aliases = &["damage", "dmg"];
const STAT_FIRE_RATE: Aliases = &["fire_rate", "fireRate", "rpm"];
const STAT_ACCURACY: Aliases = &["accuracy"];
const STAT_RANGE: Aliases = &["range"];
const STAT_ARMOR: Aliases = &["armor", "armor_value"];
const STAT_DURABILITY: Aliases = &["durability"];
const STAT_WEIGHT: Aliases = &["weight"];

const INGREDIENTS: Aliases = &["ingredients", "materials"];
const RESULT_QUANTITY: Aliases = &["result_quantity", "quantity"];
const CRAFTING_TIME: Aliases = &["time", "crafting_time"];
const HIDEOUT_LEVEL: Aliases = &["hideout_level", "required_hideout_level", "workbench_level"];

const MATERIALS: Aliases = &["materials"];

/// Map one raw record to an [`Item`]. Never fails.
pub fn normalize_item(raw: &RawRecord) -> Item {
    let fields = Fields::new(raw);

    Item {
        id: fields.id(),
        name: fields.name(),
        description: fields.string(DESCRIPTION),
        category: fields
            .string(CATEGORY)
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        subcategory: fields.string(SUBCATEGORY),
        rarity: fields.string(RARITY),
        weight: fields.f64(WEIGHT),
        value: fields.i64(VALUE),
        stats: fields.object(STATS).map(stats),
        crafting: fields.object(CRAFTING).map(crafting),
        recycle: fields.object(RECYCLE).map(recycle),
        traders: fields.reference_set(TRADERS),
        quest_requirements: fields.reference_set(QUESTS),
        image_url: fields.string(IMAGE),
    }
}

fn stats(fields: Fields<'_>) -> ItemStats {
    ItemStats {
        damage: fields.f64(STAT_DAMAGE),
        fire_rate: fields.f64(STAT_FIRE_RATE),
        accuracy: fields.f64(STAT_ACCURACY),
        range: fields.f64(STAT_RANGE),
        armor: fields.f64(STAT_ARMOR),
        durability: fields.f64(STAT_DURABILITY),
        weight: fields.f64(STAT_WEIGHT),
    }
}

fn crafting(fields: Fields<'_>) -> CraftingRecipe {
    CraftingRecipe {
        ingredients: fields.count_map(INGREDIENTS),
        result_quantity: fields.u32(RESULT_QUANTITY).unwrap_or(1).max(1),
        crafting_time: fields.u32(CRAFTING_TIME),
        required_hideout_level: fields.u32(HIDEOUT_LEVEL),
    }
}

fn recycle(fields: Fields<'_>) -> RecycleYield {
    // Some sources put the material counts directly in the recycle object
    let materials = if fields.lookup(MATERIALS).is_some() {
        fields.count_map(MATERIALS)
    } else {
        counts_from_object(fields.raw())
    };
    RecycleYield { materials }
}
