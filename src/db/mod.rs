use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use crate::config::DatabaseConfig;
use crate::models::{CreditCard, NewCard};
use crate::types::AppResult;
use anyhow::Result;

pub use filter::*;
pub use memory::*;
pub use operations::*;
pub use pool::*;

pub mod filter;
pub mod memory;
pub mod operations;
pub mod pool;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect(config.require_url()?)
        .await?;

    // Test connection
    health_check(&pool).await?;

    Ok(pool)
}

/// Catalog access used by the handlers, the backfill and the seed import.
///
/// Listing is ordered by name; `list` returns the requested page together with the
/// total number of matching cards.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn list(&self, filter: &CardFilter, page: Page) -> AppResult<(Vec<CreditCard>, i64)>;

    async fn get(&self, id: &str) -> AppResult<Option<CreditCard>>;

    /// Cards whose id is in `ids`, in no particular order. Unknown ids are skipped.
    async fn get_many(&self, ids: &[String]) -> AppResult<Vec<CreditCard>>;

    async fn count(&self) -> AppResult<i64>;

    /// Cards carrying a non-empty embedding.
    async fn with_embeddings(&self) -> AppResult<Vec<CreditCard>>;

    /// Cards whose embedding is missing or empty.
    async fn missing_embeddings(&self) -> AppResult<Vec<CreditCard>>;

    async fn set_embedding(&self, id: &str, embedding: &[f32]) -> AppResult<()>;

    async fn insert(&self, card: NewCard) -> AppResult<CreditCard>;

    async fn ping(&self) -> AppResult<()>;
}
