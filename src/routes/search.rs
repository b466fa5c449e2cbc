use axum::{
    Router,
    routing::post,
    Json,
    extract::{rejection::JsonRejection, State},
};
use validator::Validate;
use crate::embeddings::{search_explanation, VectorSearch, DEFAULT_SEARCH_LIMIT};
use crate::models::{AppState, SearchRequest, SearchResponse};
use crate::types::{AppError, AppResult};
use tracing::info;

const NO_EMBEDDINGS: &str =
    "No cards have embeddings generated yet. Run the embedding backfill (POST /api/generate-embeddings) first.";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(semantic_search))
        .with_state(state)
}

async fn semantic_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidRequest(
            "Query is required and must be a non-empty string".to_string(),
        ));
    }
    let limit = request.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    info!(query, limit, "Semantic search request");

    let search = VectorSearch::new(state.store.clone(), state.embedder.clone());
    let results = search.search(query, limit).await?;

    let explanation = if results.is_empty() {
        NO_EMBEDDINGS.to_string()
    } else {
        search_explanation(query, &results)
    };

    Ok(Json(SearchResponse {
        query: query.to_string(),
        total_found: results.len(),
        results,
        explanation,
    }))
}
