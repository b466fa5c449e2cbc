use axum::{Router, routing::get, Json, extract::State};
use crate::models::{AppState, HealthResponse};
use tracing::warn;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!(error = %e, "Health check could not reach the catalog store");
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: if database == "connected" { "ok" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: database.to_string(),
    })
}
