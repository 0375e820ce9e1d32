//! Quest routes

use arc_core::QuestFilter;
use arc_core::model::{Quest, QuestChain};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::{Value, json};

use super::extract::ApiQuery;
use super::types::{QuestSearchQuery, QuestSearchResponse, page};
use crate::error::ApiError;
use crate::state::AppState;

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Quest {} not found", id))
}

/// GET /api/quests
async fn search_quests(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<QuestSearchQuery>,
) -> Result<Json<QuestSearchResponse>, ApiError> {
    let (limit, offset) = page(query.limit, query.offset)?;
    let filter = QuestFilter {
        text: query.q,
        giver: query.giver,
        quest_type: query.quest_type,
        location: query.location,
    };

    let (quests, total) = state.engine.search_quests(&filter, limit, offset).await;

    Ok(Json(QuestSearchResponse {
        quests,
        total,
        limit,
        offset,
    }))
}

/// GET /api/quests/givers
async fn givers(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "givers": state.engine.quest_givers().await }))
}

/// GET /api/quests/types
async fn types(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "types": state.engine.quest_types().await }))
}

/// GET /api/quests/locations
async fn locations(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "locations": state.engine.quest_locations().await }))
}

/// GET /api/quests/{id}
async fn get_quest(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Quest>, ApiError> {
    state
        .engine
        .get_quest_by_id(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// GET /api/quests/{id}/requirements
async fn requirements(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (quest, required) = state
        .engine
        .quest_requirements(&id)
        .await
        .ok_or_else(|| not_found(&id))?;

    Ok(Json(json!({
        "quest_id": quest.id,
        "quest_name": quest.name,
        "required_items": required,
    })))
}

/// GET /api/quests/{id}/chain
async fn chain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuestChain>, ApiError> {
    state
        .engine
        .quest_chain(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// Create quest routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/quests", get(search_quests))
        .route("/api/quests/givers", get(givers))
        .route("/api/quests/types", get(types))
        .route("/api/quests/locations", get(locations))
        .route("/api/quests/{id}", get(get_quest))
        .route("/api/quests/{id}/requirements", get(requirements))
        .route("/api/quests/{id}/chain", get(chain))
}
