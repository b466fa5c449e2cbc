use axum::{
    Router,
    routing::get,
    Json,
    extract::{rejection::QueryRejection, Path, Query, State},
};
use crate::db::CardQuery;
use crate::models::{AppState, CardListResponse, CreditCard, Pagination};
use crate::types::{AppError, AppResult};
use tracing::debug;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/cards", get(list_cards))
        .route("/api/cards/{id}", get(get_card))
        .with_state(state)
}

async fn list_cards(
    State(state): State<AppState>,
    query: Result<Query<CardQuery>, QueryRejection>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> AppResult<Json<CardListResponse>> {
    let Query(query) = query?;
    let Query(pairs) = pairs?;
    let (filter, page) = query
        .with_tags(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .into_parts()?;
    debug!(?filter, ?page, "Listing cards");

    let (data, total) = state.store.list(&filter, page).await?;

    Ok(Json(CardListResponse {
        data,
        pagination: Pagination {
            total,
            limit: page.limit,
            offset: page.offset,
            has_more: page.offset.saturating_add(page.limit) < total,
        },
    }))
}

async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CreditCard>> {
    state
        .store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Card not found".to_string()))
}
