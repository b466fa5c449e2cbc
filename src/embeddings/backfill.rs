//! Embedding backfill
//!
//! Fills in embeddings for cards that have none. Cards are processed one at a time with
//! a fixed pause between calls to stay under the provider's rate limit. Cards that
//! already carry an embedding are skipped, so re-running is harmless.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::Embedder;
use crate::db::CardStore;
use crate::types::AppResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillReport {
    /// Catalog size, including cards that were skipped.
    pub total: i64,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

pub async fn backfill_embeddings(
    store: &dyn CardStore,
    embedder: &dyn Embedder,
    delay: Duration,
) -> AppResult<BackfillReport> {
    let total = store.count().await?;
    let pending = store.missing_embeddings().await?;

    info!(pending = pending.len(), total, "Starting embedding backfill");

    let mut report = BackfillReport {
        total,
        ..Default::default()
    };

    for (i, card) in pending.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = match embedder.embed(&card.embedding_text()).await {
            Ok(vector) => store
                .set_embedding(&card.id, &vector)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        report.processed += 1;
        match outcome {
            Ok(()) => {
                report.successful += 1;
                info!(card = %card.name, "Generated embedding");
            }
            Err(e) => {
                report.failed += 1;
                let message = format!("Failed to generate embedding for {}: {}", card.name, e);
                warn!("{}", message);
                report.errors.push(message);
            }
        }
    }

    info!(
        processed = report.processed,
        successful = report.successful,
        failed = report.failed,
        "Embedding backfill finished"
    );

    Ok(report)
}
