use axum::{Router, routing::post, Json, extract::State};
use serde::Serialize;
use crate::embeddings::{backfill_embeddings, BackfillReport};
use crate::models::AppState;
use crate::types::AppResult;
use tracing::info;

#[derive(Serialize)]
struct BackfillResponse {
    message: &'static str,
    #[serde(flatten)]
    results: BackfillReport,
    timestamp: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-embeddings", post(generate_embeddings))
        .with_state(state)
}

async fn generate_embeddings(State(state): State<AppState>) -> AppResult<Json<BackfillResponse>> {
    info!("Starting embedding generation for all cards");

    let results = backfill_embeddings(
        state.store.as_ref(),
        state.embedder.as_ref(),
        state.config.embedding.backfill_delay(),
    )
    .await?;

    Ok(Json(BackfillResponse {
        message: "Embedding generation completed",
        results,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
