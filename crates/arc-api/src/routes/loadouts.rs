//! Weapon, armor and loadout routes

use arc_core::model::{LoadoutSummary, TierList, WeaponDetail};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde_json::{Value, json};

use super::extract::{ApiJson, ApiQuery};
use super::types::{ArmorQuery, CompareQuery, LoadoutRequest, WeaponQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/loadouts/weapons
async fn weapons(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WeaponQuery>,
) -> Json<Value> {
    let weapons = state
        .engine
        .weapons_ranked(query.weapon_type.as_deref(), query.rarity.as_deref())
        .await;
    Json(json!({
        "total": weapons.len(),
        "weapons": weapons,
    }))
}

/// GET /api/loadouts/weapons/compare
async fn compare(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CompareQuery>,
) -> Result<Json<Value>, ApiError> {
    let ids = query.ids();
    if ids.is_empty() {
        return Err(ApiError::BadRequest("weapon_ids must not be empty".to_string()));
    }
    let comparison = state.engine.compare_weapons(&ids).await;
    Ok(Json(json!({ "comparison": comparison })))
}

/// GET /api/loadouts/weapons/{id}
async fn weapon_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WeaponDetail>, ApiError> {
    state
        .engine
        .weapon_detail(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Weapon {} not found", id)))
}

/// GET /api/loadouts/armor
async fn armor(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ArmorQuery>,
) -> Json<Value> {
    let armor = state
        .engine
        .armor_ranked(query.slot.as_deref(), query.rarity.as_deref())
        .await;
    Json(json!({
        "total": armor.len(),
        "armor": armor,
    }))
}

/// GET /api/loadouts/armor/{id}
async fn armor_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let armor = state
        .engine
        .get_armor(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Armor {} not found", id)))?;
    Ok(Json(json!({ "armor": armor })))
}

/// POST /api/loadouts/calculate
async fn calculate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoadoutRequest>,
) -> Json<LoadoutSummary> {
    Json(
        state
            .engine
            .calculate_loadout(&request.weapon_ids, &request.armor_ids)
            .await,
    )
}

/// GET /api/loadouts/tier-list
async fn tier_list(State(state): State<AppState>) -> Json<Value> {
    let tiers: TierList = state.engine.tier_list().await;
    Json(json!({ "tiers": tiers }))
}

/// Create loadout routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/loadouts/weapons", get(weapons))
        .route("/api/loadouts/weapons/compare", get(compare))
        .route("/api/loadouts/weapons/{id}", get(weapon_detail))
        .route("/api/loadouts/armor", get(armor))
        .route("/api/loadouts/armor/{id}", get(armor_detail))
        .route("/api/loadouts/calculate", post(calculate))
        .route("/api/loadouts/tier-list", get(tier_list))
}
