use std::collections::HashSet;

use axum::{
    Router,
    routing::post,
    Json,
    extract::{rejection::JsonRejection, State},
};
use serde_json::{json, Value};
use validator::Validate;
use crate::comparison::compare;
use crate::models::{AppState, CompareRequest};
use crate::types::{AppError, AppResult};
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/compare", post(compare_cards))
        .with_state(state)
}

async fn compare_cards(
    State(state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;
    request.validate()?;

    let mut seen = HashSet::new();
    if !request.card_ids.iter().all(|id| seen.insert(id.as_str())) {
        return Err(AppError::InvalidRequest(
            "cardIds must not contain duplicates".to_string(),
        ));
    }

    let mut found = state.store.get_many(&request.card_ids).await?;

    let missing: Vec<String> = request
        .card_ids
        .iter()
        .filter(|id| !found.iter().any(|c| &c.id == *id))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(AppError::CardsNotFound(missing));
    }

    // Ties in the comparison go to the earlier card, so keep the caller's order.
    found.sort_by_key(|c| request.card_ids.iter().position(|id| *id == c.id));
    info!(cards = ?request.card_ids, "Comparing cards");

    let comparison = compare(&found)?;

    Ok(Json(json!({
        "cards": &found,
        "comparison": comparison,
        "comparedAt": chrono::Utc::now().to_rfc3339(),
    })))
}
