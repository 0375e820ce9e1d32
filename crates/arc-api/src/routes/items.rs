//! Item routes

use arc_core::ItemFilter;
use arc_core::model::Item;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::{Value, json};
use tracing::debug;

use super::extract::ApiQuery;
use super::types::{ItemSearchQuery, ItemSearchResponse, RelatedQuery, page};
use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_RELATED_LIMIT: usize = 5;
const MAX_RELATED_LIMIT: usize = 20;

/// GET /api/items
async fn search_items(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ItemSearchQuery>,
) -> Result<Json<ItemSearchResponse>, ApiError> {
    let (limit, offset) = page(query.limit, query.offset)?;
    let filter = ItemFilter {
        text: query.q,
        category: query.category,
        subcategory: query.subcategory,
        rarity: query.rarity,
        trader: query.trader,
        min_value: query.min_value,
        max_value: query.max_value,
    };
    debug!("Searching items: {:?} (limit: {}, offset: {})", filter, limit, offset);

    let (items, total) = state.engine.search_items(&filter, limit, offset).await;

    Ok(Json(ItemSearchResponse {
        items,
        total,
        limit,
        offset,
    }))
}

/// GET /api/items/categories
async fn categories(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "categories": state.engine.categories().await }))
}

/// GET /api/items/rarities
async fn rarities(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "rarities": state.engine.rarities().await }))
}

/// GET /api/items/{id}
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    state
        .engine
        .get_item_by_id(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Item {} not found", id)))
}

/// GET /api/items/{id}/related
async fn related_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<RelatedQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RELATED_LIMIT);
    if !(1..=MAX_RELATED_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_RELATED_LIMIT
        )));
    }

    let related = state
        .engine
        .related_items(&id, limit)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Item {} not found", id)))?;

    Ok(Json(json!({ "related": related })))
}

/// Create item routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/items", get(search_items))
        .route("/api/items/categories", get(categories))
        .route("/api/items/rarities", get(rarities))
        .route("/api/items/{id}", get(get_item))
        .route("/api/items/{id}/related", get(related_items))
}
