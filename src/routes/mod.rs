//! API Routes
//!
//! - `/api/cards` - Filtered, paginated catalog listing and point lookups
//! - `/api/search` - Semantic search over card embeddings
//! - `/api/compare` - Side-by-side comparison of 2 to 5 cards
//! - `/api/generate-embeddings` - Embedding backfill
//! - `/api/health` - Health check
//! - `/` - Static file serving (frontend)

pub mod cards;
pub mod compare;
pub mod embeddings;
pub mod health;
pub mod search;
pub mod static_files;

use axum::{Router, routing::any};
use tower_http::trace::TraceLayer;
use crate::middleware::cors_layer;
use crate::models::AppState;
use crate::types::AppError;
use tracing::info;

/// Create the main application router
///
/// API routes are prefixed with `/api/` and take precedence over static files;
/// everything else falls through to the SPA build.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);
    let static_dir = state.config.server.static_dir.clone();

    let api_router = Router::new()
        .merge(cards::router(state.clone()))
        .merge(search::router(state.clone()))
        .merge(compare::router(state.clone()))
        .merge(embeddings::router(state.clone()))
        .merge(health::router(state))
        .route("/api/{*path}", any(api_not_found));

    Router::new()
        .merge(api_router)
        .merge(static_files::router(&static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Unknown `/api/*` paths get a JSON 404 instead of the SPA index.
async fn api_not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
