//! Catalog import from a JSON file (an array of cards in the API's camelCase shape).

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::db::CardStore;
use crate::models::NewCard;

#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

pub async fn load_cards(path: &Path) -> Result<Vec<NewCard>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let cards: Vec<NewCard> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;
    Ok(cards)
}

fn validate(card: &NewCard) -> Result<(), String> {
    if card.name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    if card.annual_fee < 0 {
        return Err(format!("annual fee must not be negative (got {})", card.annual_fee));
    }
    Ok(())
}

/// Inserts every card, logging and collecting failures instead of stopping.
pub async fn import_cards(store: &dyn CardStore, cards: Vec<NewCard>) -> SeedReport {
    let mut report = SeedReport::default();

    for card in cards {
        let name = card.name.clone();
        let result = match validate(&card) {
            Ok(()) => store.insert(card).await.map_err(|e| e.to_string()),
            Err(e) => Err(e),
        };

        match result {
            Ok(inserted) => {
                report.inserted += 1;
                info!(card = %inserted.name, id = %inserted.id, "Inserted card");
            }
            Err(e) => {
                report.failed += 1;
                let message = format!("Failed to insert card {name}: {e}");
                warn!("{}", message);
                report.errors.push(message);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryCardStore;

    #[tokio::test]
    async fn test_sample_catalog_imports_cleanly() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/cards.json");
        let cards = load_cards(&path).await.unwrap();
        assert!(cards.len() >= 8);

        let store = MemoryCardStore::new();
        let report = import_cards(&store, cards).await;
        assert_eq!(report.failed, 0);
        assert_eq!(store.len().await, report.inserted);
        assert!(store.missing_embeddings().await.unwrap().len() == report.inserted);
    }

    #[tokio::test]
    async fn test_invalid_cards_are_reported() {
        let cards: Vec<NewCard> = serde_json::from_value(serde_json::json!([
            {
                "name": "Negative",
                "issuer": "OTHER",
                "network": "VISA",
                "tier": "ENTRY",
                "annualFee": -1,
                "eligibilityMinMonthlyIncome": 15000,
                "eligibilityMinCreditScore": 650,
                "description": "",
                "applyLink": "https://example.com"
            },
            {
                "name": "Fine",
                "issuer": "OTHER",
                "network": "VISA",
                "tier": "ENTRY",
                "annualFee": 0,
                "eligibilityMinMonthlyIncome": 15000,
                "eligibilityMinCreditScore": 650,
                "description": "",
                "applyLink": "https://example.com"
            }
        ]))
        .unwrap();

        let store = MemoryCardStore::new();
        let report = import_cards(&store, cards).await;
        assert_eq!(report.inserted, 1);
        assert_eq!(report.failed, 1);
        assert!(report.errors[0].contains("Negative"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        assert!(load_cards(Path::new("does/not/exist.json")).await.is_err());
    }
}
