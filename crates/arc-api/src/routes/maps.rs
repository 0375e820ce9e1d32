//! Map routes

use arc_core::model::{GameMap, MarkerType};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::{Value, json};

use super::extract::ApiQuery;
use super::types::MarkerQuery;
use crate::error::ApiError;
use crate::state::AppState;

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Map {} not found", id))
}

async fn find_map(state: &AppState, id: &str) -> Result<GameMap, ApiError> {
    state
        .engine
        .get_map_by_id(id)
        .await
        .ok_or_else(|| not_found(id))
}

/// GET /api/maps
async fn list_maps(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.engine.get_all_maps(false).await;
    Json(json!({
        "maps": catalog.maps,
        "total": catalog.len(),
    }))
}

/// GET /api/maps/{id}
async fn get_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameMap>, ApiError> {
    find_map(&state, &id).await.map(Json)
}

/// GET /api/maps/{id}/markers
async fn markers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<MarkerQuery>,
) -> Result<Json<Value>, ApiError> {
    let marker_type = match query.marker_type.as_deref() {
        Some(name) => Some(
            MarkerType::parse(name)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown marker type '{}'", name)))?,
        ),
        None => None,
    };

    let markers = state
        .engine
        .map_markers(&id, marker_type)
        .await
        .ok_or_else(|| not_found(&id))?;

    Ok(Json(json!({
        "total": markers.len(),
        "markers": markers,
    })))
}

/// GET /api/maps/{id}/extractions
async fn extractions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let map = find_map(&state, &id).await?;
    Ok(Json(json!({ "extractions": map.extractions })))
}

/// GET /api/maps/{id}/zones
async fn zones(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let map = find_map(&state, &id).await?;
    Ok(Json(json!({ "zones": map.zones })))
}

/// GET /api/maps/{id}/loot
async fn loot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let loot = state
        .engine
        .map_loot(&id)
        .await
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(json!({ "loot_locations": loot })))
}

/// GET /api/maps/{id}/quests
async fn quests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (map, quests) = state
        .engine
        .map_quests(&id)
        .await
        .ok_or_else(|| not_found(&id))?;

    Ok(Json(json!({
        "map_id": map.id,
        "map_name": map.name,
        "quests": quests,
    })))
}

/// Create map routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/maps", get(list_maps))
        .route("/api/maps/{id}", get(get_map))
        .route("/api/maps/{id}/markers", get(markers))
        .route("/api/maps/{id}/extractions", get(extractions))
        .route("/api/maps/{id}/zones", get(zones))
        .route("/api/maps/{id}/loot", get(loot))
        .route("/api/maps/{id}/quests", get(quests))
}
