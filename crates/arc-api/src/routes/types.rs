//! Request/Response DTOs

use arc_core::model::{Item, Quest};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 200;

/// Validate paging parameters. `limit` must be in `1..=200`.
pub fn page(limit: Option<usize>, offset: Option<usize>) -> Result<(usize, usize), ApiError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, limit
        )));
    }
    Ok((limit, offset.unwrap_or(0)))
}

// ==================== Item Types ====================

/// Item search query
#[derive(Debug, Default, Deserialize)]
pub struct ItemSearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub rarity: Option<String>,
    pub trader: Option<String>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Serialize)]
pub struct ItemSearchResponse {
    pub items: Vec<Item>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<usize>,
}

// ==================== Quest Types ====================

#[derive(Debug, Default, Deserialize)]
pub struct QuestSearchQuery {
    pub q: Option<String>,
    pub giver: Option<String>,
    #[serde(rename = "type")]
    pub quest_type: Option<String>,
    pub location: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Serialize)]
pub struct QuestSearchResponse {
    pub quests: Vec<Quest>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

// ==================== Map Types ====================

#[derive(Debug, Deserialize)]
pub struct MarkerQuery {
    #[serde(rename = "type")]
    pub marker_type: Option<String>,
}

// ==================== Loadout Types ====================

#[derive(Debug, Deserialize)]
pub struct WeaponQuery {
    #[serde(rename = "type")]
    pub weapon_type: Option<String>,
    pub rarity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArmorQuery {
    pub slot: Option<String>,
    pub rarity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    /// Comma-separated weapon ids
    pub weapon_ids: String,
}

impl CompareQuery {
    pub fn ids(&self) -> Vec<String> {
        self.weapon_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoadoutRequest {
    #[serde(default)]
    pub weapon_ids: Vec<String>,
    #[serde(default)]
    pub armor_ids: Vec<String>,
}
