//! Aggregation engine
//!
//! The engine owns the cache and the fallback resolver. Every read goes
//! through a cache slot; an empty or expired slot is refreshed from upstream
//! on the spot. Upstream trouble never surfaces as an error: callers get the
//! last good snapshot, or an empty collection when there never was one.

pub mod derive;
mod search;
mod views;

pub use search::{ItemFilter, QuestFilter, paginate};

use std::collections::BTreeSet;
use std::sync::Arc;

use arc_proxy::Resource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::cache::{CacheSlot, CacheStore, FeedCatalog, ItemCatalog, MapCatalog, QuestCatalog};
use crate::config::{CacheTtlConfig, EngineConfig};
use crate::error::CoreError;
use crate::model::{
    ArmorPiece, EntityKind, FeedKind, GameMap, Item, LoadoutSummary, MapMarker, MarkerType, Quest,
    QuestChain, RankedWeapon, RequiredItem, TierList, Weapon, WeaponDetail,
};
use crate::normalize::{RawRecord, normalize_items, normalize_maps, normalize_quests};
use crate::upstream::{FallbackResolver, SourceHealth};

/// Summary counts for the item collection
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub total_items: usize,
    pub categories: usize,
    pub rarities: usize,
    pub data_sources: Vec<String>,
}

/// State of one cache slot
#[derive(Debug, Clone, Serialize)]
pub struct SlotStatus {
    pub kind: &'static str,
    pub records: usize,
    pub fetched_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub expires_in_secs: u64,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub slots: Vec<SlotStatus>,
    pub sources: Vec<SourceHealth>,
}

fn slot_status<T: Send + Sync>(slot: &CacheSlot<T>, len: fn(&T) -> usize) -> SlotStatus {
    match slot.snapshot() {
        Some(snapshot) => SlotStatus {
            kind: slot.name(),
            records: len(&snapshot.data),
            fetched_at: Some(snapshot.fetched_at),
            expired: snapshot.is_expired(),
            expires_in_secs: snapshot.remaining().as_secs(),
            source: Some(snapshot.source.clone()),
        },
        None => SlotStatus {
            kind: slot.name(),
            records: 0,
            fetched_at: None,
            expired: true,
            expires_in_secs: 0,
            source: None,
        },
    }
}

fn build_items(records: Vec<RawRecord>) -> ItemCatalog {
    ItemCatalog::new(normalize_items(&records))
}

fn build_quests(records: Vec<RawRecord>) -> QuestCatalog {
    QuestCatalog::new(normalize_quests(&records))
}

fn build_maps(records: Vec<RawRecord>) -> MapCatalog {
    MapCatalog::new(normalize_maps(&records))
}

fn build_feed(records: Vec<RawRecord>) -> FeedCatalog {
    FeedCatalog {
        records: records.into_iter().map(Value::Object).collect(),
    }
}

/// Entries matching `ids`, in request order
fn select<T: Clone>(entries: &[T], ids: &[String], id: fn(&T) -> &String) -> Vec<T> {
    ids.iter()
        .filter_map(|wanted| entries.iter().find(|e| id(e) == wanted).cloned())
        .collect()
}

/// Case-insensitive substring test; an unset needle matches everything
fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
}

pub struct AggregationEngine {
    resolver: FallbackResolver,
    cache: CacheStore,
}

impl AggregationEngine {
    /// Build HTTP-backed sources from configuration
    pub fn new(config: &EngineConfig) -> Result<Self, CoreError> {
        let resolver = FallbackResolver::from_config(&config.sources, &config.fetch)?;
        if resolver.source_names().is_empty() {
            warn!("No upstream sources enabled, every collection will be empty");
        }
        Ok(Self::with_resolver(resolver, &config.cache))
    }

    pub fn with_resolver(resolver: FallbackResolver, ttl: &CacheTtlConfig) -> Self {
        info!(
            "Initializing aggregation engine (sources: {:?}, item ttl: {}s)",
            resolver.source_names(),
            ttl.items_ttl_secs
        );
        Self {
            resolver,
            cache: CacheStore::new(ttl),
        }
    }

    pub fn resolver(&self) -> &FallbackResolver {
        &self.resolver
    }

    async fn read<T: Default + Send + Sync>(
        &self,
        slot: &CacheSlot<T>,
        resource: Resource,
        force_refresh: bool,
        build: fn(Vec<RawRecord>) -> T,
    ) -> Arc<T> {
        slot.get_or_refresh(force_refresh, || async {
            let resolved = self.resolver.resolve(resource).await?;
            Some((build(resolved.records), resolved.source))
        })
        .await
        .map(|snapshot| Arc::clone(&snapshot.data))
        .unwrap_or_default()
    }

    // ==================== Collections ====================

    pub async fn get_all_items(&self, force_refresh: bool) -> Arc<ItemCatalog> {
        self.read(&self.cache.items, Resource::Items, force_refresh, build_items)
            .await
    }

    pub async fn get_all_quests(&self, force_refresh: bool) -> Arc<QuestCatalog> {
        self.read(&self.cache.quests, Resource::Quests, force_refresh, build_quests)
            .await
    }

    pub async fn get_all_maps(&self, force_refresh: bool) -> Arc<MapCatalog> {
        self.read(&self.cache.maps, Resource::Maps, force_refresh, build_maps)
            .await
    }

    pub async fn get_feed(&self, kind: FeedKind, force_refresh: bool) -> Arc<FeedCatalog> {
        self.read(self.cache.feed(kind), kind.resource(), force_refresh, build_feed)
            .await
    }

    pub async fn events(&self) -> Arc<FeedCatalog> {
        self.get_feed(FeedKind::Events, false).await
    }

    pub async fn traders(&self) -> Arc<FeedCatalog> {
        self.get_feed(FeedKind::Traders, false).await
    }

    /// Load every entity collection
    pub async fn preload(&self) {
        let (items, quests, maps) = futures::join!(
            self.get_all_items(false),
            self.get_all_quests(false),
            self.get_all_maps(false)
        );
        info!(
            "Preloaded {} items, {} quests, {} maps",
            items.len(),
            quests.len(),
            maps.len()
        );
    }

    /// Force a refresh of every slot. Failed refreshes keep their old data.
    pub async fn refresh_all(&self) -> CacheStatus {
        futures::join!(
            self.get_all_items(true),
            self.get_all_quests(true),
            self.get_all_maps(true),
            self.get_feed(FeedKind::Events, true),
            self.get_feed(FeedKind::Traders, true)
        );
        self.cache_status()
    }

    // ==================== Search ====================

    pub async fn search_items(
        &self,
        filter: &ItemFilter,
        limit: usize,
        offset: usize,
    ) -> (Vec<Item>, usize) {
        let catalog = self.get_all_items(false).await;
        paginate(filter.apply(&catalog.items), limit, offset)
    }

    pub async fn search_quests(
        &self,
        filter: &QuestFilter,
        limit: usize,
        offset: usize,
    ) -> (Vec<Quest>, usize) {
        let catalog = self.get_all_quests(false).await;
        paginate(filter.apply(&catalog.quests), limit, offset)
    }

    pub async fn get_item_by_id(&self, id: &str) -> Option<Item> {
        self.get_all_items(false).await.get(id).cloned()
    }

    pub async fn get_quest_by_id(&self, id: &str) -> Option<Quest> {
        self.get_all_quests(false).await.get(id).cloned()
    }

    pub async fn get_map_by_id(&self, id: &str) -> Option<GameMap> {
        self.get_all_maps(false).await.get(id).cloned()
    }

    // ==================== Indices ====================

    pub async fn categories(&self) -> BTreeSet<String> {
        self.get_all_items(false).await.categories.clone()
    }

    pub async fn rarities(&self) -> BTreeSet<String> {
        self.get_all_items(false).await.rarities.clone()
    }

    pub async fn quest_givers(&self) -> BTreeSet<String> {
        self.get_all_quests(false).await.givers.clone()
    }

    pub async fn quest_types(&self) -> BTreeSet<String> {
        self.get_all_quests(false).await.types.clone()
    }

    pub async fn quest_locations(&self) -> BTreeSet<String> {
        self.get_all_quests(false).await.locations.clone()
    }

    // ==================== Weapons and armor ====================

    pub async fn derive_weapons(&self) -> Vec<Weapon> {
        derive::derive_weapons(&self.get_all_items(false).await.items)
    }

    pub async fn derive_armor(&self) -> Vec<ArmorPiece> {
        derive::derive_armor(&self.get_all_items(false).await.items)
    }

    /// Weapons by DPS, highest first. `weapon_type` is a case-insensitive
    /// substring, `rarity` must match exactly.
    pub async fn weapons_ranked(
        &self,
        weapon_type: Option<&str>,
        rarity: Option<&str>,
    ) -> Vec<RankedWeapon> {
        let weapons = self
            .derive_weapons()
            .await
            .into_iter()
            .filter(|w| contains_ci(&w.weapon_type, weapon_type))
            .filter(|w| rarity.is_none_or(|r| w.rarity.as_deref() == Some(r)))
            .collect();
        derive::rank_weapons(weapons)
    }

    /// Armor by armor value, highest first. `slot` is a case-insensitive
    /// substring, `rarity` must match exactly.
    pub async fn armor_ranked(&self, slot: Option<&str>, rarity: Option<&str>) -> Vec<ArmorPiece> {
        let armor = self
            .derive_armor()
            .await
            .into_iter()
            .filter(|a| contains_ci(&a.slot, slot))
            .filter(|a| rarity.is_none_or(|r| a.rarity.as_deref() == Some(r)))
            .collect();
        derive::rank_armor(armor)
    }

    pub async fn get_armor(&self, id: &str) -> Option<ArmorPiece> {
        self.derive_armor().await.into_iter().find(|a| a.id == id)
    }

    pub async fn weapon_detail(&self, id: &str) -> Option<WeaponDetail> {
        self.derive_weapons()
            .await
            .into_iter()
            .find(|w| w.id == id)
            .map(derive::weapon_detail)
    }

    /// Requested weapons in request order; unknown ids are skipped
    pub async fn compare_weapons(&self, ids: &[String]) -> Vec<RankedWeapon> {
        let weapons = self.derive_weapons().await;
        select(&weapons, ids, |w| &w.id)
            .into_iter()
            .map(derive::rank)
            .collect()
    }

    /// Resolve a loadout and total its stats. Unknown ids are skipped.
    pub async fn calculate_loadout(
        &self,
        weapon_ids: &[String],
        armor_ids: &[String],
    ) -> LoadoutSummary {
        let items = self.get_all_items(false).await;
        let weapons = derive::derive_weapons(&items.items);
        let armor = derive::derive_armor(&items.items);
        let stats = derive::loadout_stats(&weapons, &armor, weapon_ids, armor_ids);

        LoadoutSummary {
            weapons: select(&weapons, weapon_ids, |w| &w.id),
            armor: select(&armor, armor_ids, |a| &a.id),
            stats,
        }
    }

    pub async fn tier_list(&self) -> TierList {
        derive::tier_list(self.derive_weapons().await)
    }

    // ==================== Cross-collection views ====================

    pub async fn related_items(&self, id: &str, limit: usize) -> Option<Vec<Item>> {
        let catalog = self.get_all_items(false).await;
        let item = catalog.get(id)?;
        Some(views::related_items(item, &catalog.items, limit))
    }

    pub async fn quest_requirements(&self, id: &str) -> Option<(Quest, Vec<RequiredItem>)> {
        let quest = self.get_quest_by_id(id).await?;
        let items = self.get_all_items(false).await;
        let required = views::quest_requirements(&quest, &items.items);
        Some((quest, required))
    }

    pub async fn quest_chain(&self, id: &str) -> Option<QuestChain> {
        let catalog = self.get_all_quests(false).await;
        let quest = catalog.get(id)?;
        Some(views::quest_chain(quest, &catalog.quests))
    }

    pub async fn map_markers(
        &self,
        id: &str,
        marker_type: Option<MarkerType>,
    ) -> Option<Vec<MapMarker>> {
        let map = self.get_map_by_id(id).await?;
        Some(views::map_markers(&map, marker_type))
    }

    pub async fn map_loot(&self, id: &str) -> Option<Vec<MapMarker>> {
        let map = self.get_map_by_id(id).await?;
        Some(views::map_loot(&map))
    }

    pub async fn map_quests(&self, id: &str) -> Option<(GameMap, Vec<Quest>)> {
        let map = self.get_map_by_id(id).await?;
        let quests = self.get_all_quests(false).await;
        let found = views::map_quests(&map, &quests.quests);
        Some((map, found))
    }

    // ==================== Status ====================

    pub async fn stats(&self) -> EngineStats {
        let items = self.get_all_items(false).await;
        EngineStats {
            total_items: items.len(),
            categories: items.categories.len(),
            rarities: items.rarities.len(),
            data_sources: self.resolver.source_names(),
        }
    }

    /// Slot states without triggering any refresh
    pub fn cache_status(&self) -> CacheStatus {
        let mut slots = Vec::with_capacity(EntityKind::ALL.len() + FeedKind::ALL.len());
        slots.push(slot_status(&self.cache.items, ItemCatalog::len));
        slots.push(slot_status(&self.cache.quests, QuestCatalog::len));
        slots.push(slot_status(&self.cache.maps, MapCatalog::len));
        for kind in FeedKind::ALL {
            slots.push(slot_status(self.cache.feed(kind), FeedCatalog::len));
        }

        CacheStatus {
            slots,
            sources: self.resolver.health(),
        }
    }

    /// Release upstream connections. Cached data stays readable.
    pub async fn close(&self) {
        self.resolver.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.resolver.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::RegisteredSource;
    use crate::upstream::testing::{FakeSource, register};
    use serde_json::json;

    fn ttl(secs: u64) -> CacheTtlConfig {
        CacheTtlConfig {
            items_ttl_secs: secs,
            quests_ttl_secs: secs,
            maps_ttl_secs: secs,
            events_ttl_secs: secs,
            traders_ttl_secs: secs,
        }
    }

    fn engine(sources: Vec<RegisteredSource>, secs: u64) -> AggregationEngine {
        AggregationEngine::with_resolver(FallbackResolver::new(sources), &ttl(secs))
    }

    fn sample_items() -> Vec<Value> {
        vec![
            json!({"id": "a", "name": "Anvil", "category": "weapon", "value": 100, "stats": {"damage": 50, "fire_rate": 600, "accuracy": 80}}),
            json!({"id": "b", "name": "Light Vest", "category": "armor", "value": 100, "stats": {"armor": 20}, "weight": 4}),
            json!({"_id": "x123", "name": "Relic", "price": 500, "tier": "epic"}),
            json!({"id": "d", "name": "Hullcracker", "category": "weapon", "rarity": "epic", "stats": {"damage": 80}}),
            json!("garbage"),
        ]
    }

    #[tokio::test]
    async fn test_stale_snapshot_served_when_all_sources_empty() {
        let source = FakeSource::new();
        source.set(Resource::Items, sample_items());
        let engine = engine(vec![register("primary", 1, source.clone())], 0);

        let first = engine.get_all_items(false).await;
        let first_status = engine.cache_status().slots[0].clone();
        assert_eq!(first.len(), 4);

        source.fail(Resource::Items);
        let second = engine.get_all_items(false).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls(), 2);
        let snapshot = engine.cache.items.snapshot().unwrap();
        assert!(snapshot.is_expired());
        assert_eq!(Some(snapshot.fetched_at), first_status.fetched_at);
    }

    #[tokio::test]
    async fn test_empty_collection_without_prior_snapshot() {
        let source = FakeSource::new();
        source.fail(Resource::Quests);
        let engine = engine(vec![register("primary", 1, source)], 3600);

        assert!(engine.get_all_quests(false).await.is_empty());
        assert!(engine.get_all_maps(false).await.is_empty());
        assert!(engine.cache.quests.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_repeated_reads_within_ttl_fetch_once() {
        let source = FakeSource::new();
        source.set(Resource::Items, sample_items());
        let engine = engine(vec![register("primary", 1, source.clone())], 3600);

        let first = engine.get_all_items(false).await;
        let second = engine.get_all_items(false).await;

        assert_eq!(source.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));

        engine.get_all_items(true).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_fallback_serves_secondary() {
        let primary = FakeSource::new();
        let secondary = FakeSource::new();
        primary.fail(Resource::Items);
        secondary.set(Resource::Items, sample_items());
        let engine = engine(
            vec![register("primary", 1, primary), register("secondary", 2, secondary)],
            3600,
        );

        assert_eq!(engine.get_all_items(false).await.len(), 4);
        let status = engine.cache_status();
        assert_eq!(status.slots[0].source.as_deref(), Some("secondary"));
        assert!(!status.slots[0].expired);
    }

    #[tokio::test]
    async fn test_search_conjunction_and_pagination() {
        let source = FakeSource::new();
        source.set(Resource::Items, sample_items());
        let engine = engine(vec![register("primary", 1, source)], 3600);

        let filter = ItemFilter {
            category: Some("weapon".to_string()),
            min_value: Some(50),
            ..Default::default()
        };
        let (page, total) = engine.search_items(&filter, 50, 0).await;
        assert_eq!(total, 1);
        assert_eq!(page[0].id, "a");

        let everything = ItemFilter::default();
        let (page, total) = engine.search_items(&everything, 3, 2).await;
        assert_eq!(total, 4);
        assert_eq!(page.len(), 2);
        let (page, total) = engine.search_items(&everything, 3, 10).await;
        assert_eq!(total, 4);
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_by_alias_id_and_not_found() {
        let source = FakeSource::new();
        source.set(Resource::Items, sample_items());
        let engine = engine(vec![register("primary", 1, source)], 3600);

        let relic = engine.get_item_by_id("x123").await.unwrap();
        assert_eq!(relic.value, Some(500));
        assert_eq!(relic.rarity.as_deref(), Some("epic"));
        assert!(engine.get_item_by_id("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_derived_views() {
        let source = FakeSource::new();
        source.set(Resource::Items, sample_items());
        let engine = engine(vec![register("primary", 1, source)], 3600);

        let ranked = engine.weapons_ranked(None, None).await;
        let dps: Vec<(String, f64)> = ranked
            .iter()
            .map(|r| (r.weapon.id.clone(), r.calculated_dps))
            .collect();
        assert_eq!(dps, vec![("a".to_string(), 400.0), ("d".to_string(), 80.0)]);

        let epic = engine.weapons_ranked(Some("WEAP"), Some("epic")).await;
        assert_eq!(epic.len(), 1);
        assert_eq!(epic[0].weapon.id, "d");

        let detail = engine.weapon_detail("a").await.unwrap();
        assert_eq!(detail.dps_calculation.effective_dps, 400.0);
        assert!(engine.weapon_detail("b").await.is_none());

        let compared = engine
            .compare_weapons(&["d".to_string(), "missing".to_string(), "a".to_string()])
            .await;
        let ids: Vec<&str> = compared.iter().map(|r| r.weapon.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "a"]);

        let armor = engine.armor_ranked(Some("chest"), None).await;
        assert_eq!(armor.len(), 1);
        assert_eq!(armor[0].weight, 4.0);

        let loadout = engine
            .calculate_loadout(&["a".to_string()], &["b".to_string(), "a".to_string()])
            .await;
        assert_eq!(loadout.weapons.len(), 1);
        assert_eq!(loadout.armor.len(), 1);
        let stats = loadout.stats;
        assert_eq!(stats.total_dps, 400.0);
        assert_eq!(stats.movement_penalty, 2.0);
        assert_eq!(stats.survivability_score, 19.6);

        let tiers = engine.tier_list().await;
        assert_eq!(tiers.s[0].weapon.id, "a");
        assert_eq!(tiers.b[0].weapon.id, "d");
    }

    #[tokio::test]
    async fn test_quest_and_map_views() {
        let source = FakeSource::new();
        source.set(Resource::Items, sample_items());
        source.set(
            Resource::Quests,
            vec![
                json!({"id": "q1", "name": "Power Outage", "giver": "Shani", "location": "Dam", "required_items": [{"id": "a", "count": 2}]}),
                json!({"id": "q2", "name": "Follow Up", "giver": "Celeste", "prerequisites": ["q1"]}),
            ],
        );
        source.set(
            Resource::Maps,
            vec![json!({"id": "dam", "name": "Dam", "markers": [{"id": "m1", "type": "loot", "quests": ["q2"]}]})],
        );
        let engine = engine(vec![register("primary", 1, source)], 3600);

        let givers: Vec<String> = engine.quest_givers().await.into_iter().collect();
        assert_eq!(givers, vec!["Celeste", "Shani"]);

        let (quest, required) = engine.quest_requirements("q1").await.unwrap();
        assert_eq!(quest.name, "Power Outage");
        assert_eq!(required[0].item.id, "a");
        assert_eq!(required[0].count, 2);

        let chain = engine.quest_chain("q1").await.unwrap();
        assert_eq!(chain.follow_ups[0].id, "q2");
        assert!(engine.quest_chain("nope").await.is_none());

        let (_, quests) = engine.map_quests("dam").await.unwrap();
        let ids: Vec<&str> = quests.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
        assert_eq!(engine.map_loot("dam").await.unwrap().len(), 1);
        assert!(engine.map_markers("nowhere", None).await.is_none());
    }

    #[tokio::test]
    async fn test_feeds_are_passed_through() {
        let source = FakeSource::new();
        source.set(Resource::Events, vec![json!({"name": "Storm", "starts": "soon"}), json!(1)]);
        let engine = engine(vec![register("primary", 1, source)], 3600);

        let events = engine.events().await;
        assert_eq!(events.records, vec![json!({"name": "Storm", "starts": "soon"})]);
        assert!(engine.traders().await.is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_status() {
        let source = FakeSource::new();
        source.set(Resource::Items, sample_items());
        let engine = engine(vec![register("primary", 1, source)], 3600);

        let stats = engine.stats().await;
        assert_eq!(stats.total_items, 4);
        assert_eq!(stats.categories, 3); // weapon, armor, misc
        assert_eq!(stats.rarities, 1);
        assert_eq!(stats.data_sources, vec!["primary"]);

        let status = engine.cache_status();
        assert_eq!(status.slots.len(), 5);
        assert_eq!(status.slots[0].records, 4);
        assert!(status.slots[1].fetched_at.is_none());
    }

    #[tokio::test]
    async fn test_close_keeps_cached_data() {
        let source = FakeSource::new();
        source.set(Resource::Items, sample_items());
        let engine = engine(vec![register("primary", 1, source.clone())], 0);

        engine.get_all_items(false).await;
        engine.close().await;
        engine.close().await;

        assert!(engine.is_closed());
        assert_eq!(engine.get_all_items(false).await.len(), 4);
        assert_eq!(source.calls(), 1);
    }
}
