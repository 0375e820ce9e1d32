//! Weapon and armor views computed from items, and the math over them

use crate::model::{
    ArmorPiece, DpsBreakdown, Item, LoadoutStats, RankedWeapon, TierList, TimeToKill, Weapon,
    WeaponDetail,
};

const WEAPON_CATEGORIES: &[&str] = &[
    "weapon", "weapons", "primary", "secondary", "pistol", "rifle", "smg", "shotgun", "sniper",
];
const ARMOR_CATEGORIES: &[&str] = &["armor", "helmet", "vest", "chest", "legs", "gear"];

const DEFAULT_MAGAZINE_SIZE: u32 = 30;
const DEFAULT_RELOAD_TIME: f64 = 2.0;
const DEFAULT_ARMOR_SLOT: &str = "chest";
const DEFAULT_DURABILITY: f64 = 100.0;

/// Movement penalty per unit of armor weight, in percent
const PENALTY_PER_WEIGHT: f64 = 0.5;
const MAX_MOVEMENT_PENALTY: f64 = 30.0;

/// Target health pools for time-to-kill: unarmored, light, heavy
const TTK_TARGETS: (f64, f64, f64) = (100.0, 150.0, 250.0);

/// Upper bounds of the tier bands, as a fraction of the ranking
const TIER_BANDS: [f64; 4] = [0.1, 0.3, 0.55, 0.8];

fn in_categories(item: &Item, categories: &[&str]) -> bool {
    let category = item.category.to_lowercase();
    categories.contains(&category.as_str())
}

/// Weapon view of an item, or `None` when the item is not a weapon
pub fn weapon_from_item(item: &Item) -> Option<Weapon> {
    if !in_categories(item, WEAPON_CATEGORIES) {
        return None;
    }
    let stats = item.stats.clone().unwrap_or_default();

    Some(Weapon {
        id: item.id.clone(),
        name: item.name.clone(),
        weapon_type: item
            .subcategory
            .clone()
            .unwrap_or_else(|| item.category.clone()),
        rarity: item.rarity.clone(),
        base_damage: stats.damage.unwrap_or(0.0),
        fire_rate: stats.fire_rate.unwrap_or(0.0),
        accuracy: stats.accuracy.unwrap_or(0.0),
        recoil: 0.0,
        range: stats.range.unwrap_or(0.0),
        magazine_size: DEFAULT_MAGAZINE_SIZE,
        reload_time: DEFAULT_RELOAD_TIME,
        mod_slots: Vec::new(),
        image_url: item.image_url.clone(),
    })
}

/// Armor view of an item, or `None` when the item is not armor
pub fn armor_from_item(item: &Item) -> Option<ArmorPiece> {
    if !in_categories(item, ARMOR_CATEGORIES) {
        return None;
    }
    let stats = item.stats.clone().unwrap_or_default();

    Some(ArmorPiece {
        id: item.id.clone(),
        name: item.name.clone(),
        slot: item
            .subcategory
            .clone()
            .unwrap_or_else(|| DEFAULT_ARMOR_SLOT.to_string()),
        rarity: item.rarity.clone(),
        armor_value: stats.armor.unwrap_or(0.0),
        durability: stats.durability.unwrap_or(DEFAULT_DURABILITY),
        weight: stats.weight.or(item.weight).unwrap_or(0.0),
        special_effects: Vec::new(),
        image_url: item.image_url.clone(),
    })
}

pub fn derive_weapons(items: &[Item]) -> Vec<Weapon> {
    items.iter().filter_map(weapon_from_item).collect()
}

pub fn derive_armor(items: &[Item]) -> Vec<ArmorPiece> {
    items.iter().filter_map(armor_from_item).collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Damage per second before accuracy. Weapons without a fire rate are
/// single-shot and deal their base damage.
fn raw_dps(weapon: &Weapon) -> f64 {
    if weapon.fire_rate <= 0.0 {
        weapon.base_damage
    } else {
        weapon.base_damage * weapon.fire_rate / 60.0
    }
}

/// Accuracy-adjusted DPS, rounded to 2 decimals
pub fn compute_dps(weapon: &Weapon) -> f64 {
    let mut dps = raw_dps(weapon);
    if weapon.fire_rate > 0.0 && weapon.accuracy > 0.0 {
        dps *= weapon.accuracy / 100.0;
    }
    round_to(dps, 2)
}

fn time_to_kill(hp: f64, dps: f64) -> f64 {
    if dps > 0.0 { round_to(hp / dps, 2) } else { 0.0 }
}

pub fn weapon_detail(weapon: Weapon) -> WeaponDetail {
    let dps = compute_dps(&weapon);
    let (no_armor, light_armor, heavy_armor) = TTK_TARGETS;

    let dps_calculation = DpsBreakdown {
        weapon_id: weapon.id.clone(),
        base_dps: round_to(raw_dps(&weapon), 2),
        // No attachment data upstream, so mods never change the result
        modded_dps: dps,
        effective_dps: dps,
        time_to_kill: TimeToKill {
            no_armor: time_to_kill(no_armor, dps),
            light_armor: time_to_kill(light_armor, dps),
            heavy_armor: time_to_kill(heavy_armor, dps),
        },
    };

    WeaponDetail {
        weapon,
        dps_calculation,
    }
}

pub fn rank(weapon: Weapon) -> RankedWeapon {
    RankedWeapon {
        calculated_dps: compute_dps(&weapon),
        weapon,
    }
}

/// Pair each weapon with its DPS, highest first. Equal DPS keeps input order.
pub fn rank_weapons(weapons: Vec<Weapon>) -> Vec<RankedWeapon> {
    let mut ranked: Vec<RankedWeapon> = weapons.into_iter().map(rank).collect();
    ranked.sort_by(|a, b| b.calculated_dps.total_cmp(&a.calculated_dps));
    ranked
}

/// Sort armor by armor value, highest first. Equal values keep input order.
pub fn rank_armor(mut armor: Vec<ArmorPiece>) -> Vec<ArmorPiece> {
    armor.sort_by(|a, b| b.armor_value.total_cmp(&a.armor_value));
    armor
}

/// Bucket weapons into tiers by their position in the DPS ranking
pub fn tier_list(weapons: Vec<Weapon>) -> TierList {
    let ranked = rank_weapons(weapons);
    let total = ranked.len() as f64;
    let mut tiers = TierList::default();

    for (index, weapon) in ranked.into_iter().enumerate() {
        let position = index as f64 / total;
        let tier = match TIER_BANDS.iter().position(|bound| position < *bound) {
            Some(0) => &mut tiers.s,
            Some(1) => &mut tiers.a,
            Some(2) => &mut tiers.b,
            Some(_) => &mut tiers.c,
            None => &mut tiers.d,
        };
        tier.push(weapon);
    }

    tiers
}

/// Combined stats for the selected weapons and armor. Ids that match
/// nothing are skipped; a repeated id counts once per occurrence.
pub fn loadout_stats(
    weapons: &[Weapon],
    armor: &[ArmorPiece],
    weapon_ids: &[String],
    armor_ids: &[String],
) -> LoadoutStats {
    let total_dps: f64 = weapon_ids
        .iter()
        .filter_map(|id| weapons.iter().find(|w| &w.id == id))
        .map(compute_dps)
        .sum();

    let (total_armor, total_weight) = armor_ids
        .iter()
        .filter_map(|id| armor.iter().find(|a| &a.id == id))
        .fold((0.0, 0.0), |(value, weight), piece| {
            (value + piece.armor_value, weight + piece.weight)
        });

    let movement_penalty = (total_weight * PENALTY_PER_WEIGHT).min(MAX_MOVEMENT_PENALTY);
    let survivability = total_armor * (1.0 - movement_penalty / 100.0);

    LoadoutStats {
        total_dps: round_to(total_dps, 2),
        total_armor: round_to(total_armor, 2),
        total_weight: round_to(total_weight, 2),
        movement_penalty: round_to(movement_penalty, 1),
        survivability_score: round_to(survivability, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_item, record};
    use serde_json::json;

    fn weapon(id: &str, base_damage: f64, fire_rate: f64, accuracy: f64) -> Weapon {
        Weapon {
            id: id.to_string(),
            name: id.to_string(),
            weapon_type: "rifle".to_string(),
            rarity: None,
            base_damage,
            fire_rate,
            accuracy,
            recoil: 0.0,
            range: 0.0,
            magazine_size: DEFAULT_MAGAZINE_SIZE,
            reload_time: DEFAULT_RELOAD_TIME,
            mod_slots: Vec::new(),
            image_url: None,
        }
    }

    fn armor(id: &str, armor_value: f64, weight: f64) -> ArmorPiece {
        ArmorPiece {
            id: id.to_string(),
            name: id.to_string(),
            slot: DEFAULT_ARMOR_SLOT.to_string(),
            rarity: None,
            armor_value,
            durability: DEFAULT_DURABILITY,
            weight,
            special_effects: Vec::new(),
            image_url: None,
        }
    }

    #[test]
    fn test_dps_with_accuracy() {
        assert_eq!(compute_dps(&weapon("w", 50.0, 600.0, 80.0)), 400.0);
    }

    #[test]
    fn test_dps_single_shot() {
        assert_eq!(compute_dps(&weapon("w", 80.0, 0.0, 90.0)), 80.0);
    }

    #[test]
    fn test_dps_rounding() {
        // 33 * 100 / 60 = 55.0, * 0.77 = 42.35
        assert_eq!(compute_dps(&weapon("w", 33.0, 100.0, 77.0)), 42.35);
        // 10 * 7 / 60 = 1.1666..
        assert_eq!(compute_dps(&weapon("w", 10.0, 7.0, 0.0)), 1.17);
    }

    #[test]
    fn test_weapon_defaults() {
        let item = normalize_item(&record(json!({
            "id": "ferro",
            "name": "Ferro",
            "category": "Weapon",
            "stats": {"damage": 40}
        })));
        let weapon = weapon_from_item(&item).unwrap();

        assert_eq!(weapon.weapon_type, "Weapon");
        assert_eq!(weapon.base_damage, 40.0);
        assert_eq!(weapon.fire_rate, 0.0);
        assert_eq!(weapon.magazine_size, 30);
        assert_eq!(weapon.reload_time, 2.0);
        assert!(weapon.mod_slots.is_empty());
    }

    #[test]
    fn test_weapon_type_from_subcategory() {
        let item = normalize_item(&record(json!({
            "id": "stitcher", "category": "smg", "subcategory": "Compact"
        })));
        assert_eq!(weapon_from_item(&item).unwrap().weapon_type, "Compact");
    }

    #[test]
    fn test_non_weapon_is_skipped() {
        let item = normalize_item(&record(json!({"id": "fuse", "category": "material"})));
        assert!(weapon_from_item(&item).is_none());
        assert!(armor_from_item(&item).is_none());
    }

    #[test]
    fn test_armor_defaults() {
        let plain = normalize_item(&record(json!({"id": "vest", "category": "armor", "weight": 4.5})));
        let piece = armor_from_item(&plain).unwrap();
        assert_eq!(piece.slot, "chest");
        assert_eq!(piece.armor_value, 0.0);
        assert_eq!(piece.durability, 100.0);
        assert_eq!(piece.weight, 4.5);

        let stated = normalize_item(&record(json!({
            "id": "helm",
            "category": "helmet",
            "type": "head",
            "weight": 4.5,
            "stats": {"armor": 20, "durability": 60, "weight": 2}
        })));
        let piece = armor_from_item(&stated).unwrap();
        assert_eq!(piece.slot, "head");
        assert_eq!(piece.armor_value, 20.0);
        assert_eq!(piece.durability, 60.0);
        assert_eq!(piece.weight, 2.0);
    }

    #[test]
    fn test_tier_bands_for_ten_weapons() {
        let weapons = (0..10)
            .map(|i| weapon(&format!("w{}", i), 10.0 * (i + 1) as f64, 0.0, 0.0))
            .collect();
        let tiers = tier_list(weapons);

        assert_eq!(tiers.s.len(), 1);
        assert_eq!(tiers.s[0].weapon.id, "w9");
        assert_eq!(tiers.a.len(), 2);
        assert_eq!(tiers.b.len(), 3); // 0.3, 0.4, 0.5
        assert_eq!(tiers.c.len(), 2);
        assert_eq!(tiers.d.len(), 2);
        assert_eq!(tiers.d.last().unwrap().weapon.id, "w0");
    }

    #[test]
    fn test_tier_list_empty() {
        assert_eq!(tier_list(Vec::new()), TierList::default());
    }

    #[test]
    fn test_ranking_is_stable_on_ties() {
        let ranked = rank_weapons(vec![
            weapon("first", 50.0, 0.0, 0.0),
            weapon("top", 90.0, 0.0, 0.0),
            weapon("second", 50.0, 0.0, 0.0),
        ]);
        let ids: Vec<&str> = ranked.iter().map(|r| r.weapon.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "first", "second"]);
    }

    #[test]
    fn test_weapon_detail_time_to_kill() {
        let detail = weapon_detail(weapon("w", 50.0, 600.0, 80.0));
        let calc = &detail.dps_calculation;
        assert_eq!(calc.base_dps, 500.0);
        assert_eq!(calc.effective_dps, 400.0);
        assert_eq!(calc.time_to_kill.no_armor, 0.25);
        assert_eq!(calc.time_to_kill.light_armor, 0.38);
        assert_eq!(calc.time_to_kill.heavy_armor, 0.63);

        let idle = weapon_detail(weapon("idle", 0.0, 0.0, 0.0));
        assert_eq!(idle.dps_calculation.time_to_kill.no_armor, 0.0);
    }

    #[test]
    fn test_loadout_stats() {
        let weapons = vec![weapon("ar", 50.0, 600.0, 80.0), weapon("dmr", 80.0, 0.0, 0.0)];
        let armor = vec![armor("vest", 40.0, 20.0), armor("helm", 15.5, 50.0)];

        let stats = loadout_stats(
            &weapons,
            &armor,
            &["ar".to_string(), "dmr".to_string(), "missing".to_string()],
            &["vest".to_string()],
        );
        assert_eq!(stats.total_dps, 480.0);
        assert_eq!(stats.total_armor, 40.0);
        assert_eq!(stats.total_weight, 20.0);
        assert_eq!(stats.movement_penalty, 10.0);
        assert_eq!(stats.survivability_score, 36.0);

        // 70 weight would be a 35% penalty; capped at 30
        let heavy = loadout_stats(&weapons, &armor, &[], &["vest".to_string(), "helm".to_string()]);
        assert_eq!(heavy.movement_penalty, 30.0);
        assert_eq!(heavy.survivability_score, 38.85);
    }
}
