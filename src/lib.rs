// CardGuru - credit card discovery: catalog filters, semantic search and comparison

pub mod config;
pub mod db;
pub mod models;
pub mod types;
pub mod embeddings;
pub mod comparison;
pub mod seed;
pub mod routes;
pub mod middleware;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
