//! Similarity ranking over card embeddings.
//!
//! Linear scan: every query embeds once, then scores every card that has an embedding.
//! Fine for a catalog of tens of cards; there is no index.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::Embedder;
use crate::db::CardStore;
use crate::models::{ScoredCard, Tier};
use crate::types::AppResult;

pub const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Error, PartialEq)]
pub enum VectorError {
    #[error("vectors must have the same length (got {left} and {right})")]
    DimensionMismatch { left: usize, right: usize },
}

/// `dot(a, b) / (|a| * |b|)`. A zero-norm vector scores 0.0 against anything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, VectorError> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Scores every candidate against `query` and orders them by descending score.
/// Equal scores keep their input order.
pub fn rank<'a, K, I>(query: &[f32], candidates: I) -> Result<Vec<(K, f32)>, VectorError>
where
    I: IntoIterator<Item = (K, &'a [f32])>,
{
    let mut scored = candidates
        .into_iter()
        .map(|(key, vector)| cosine_similarity(query, vector).map(|score| (key, score)))
        .collect::<Result<Vec<_>, _>>()?;

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(scored)
}

/// Semantic search over the catalog.
#[derive(Clone)]
pub struct VectorSearch {
    store: Arc<dyn CardStore>,
    embedder: Arc<dyn Embedder>,
}

impl VectorSearch {
    pub fn new(store: Arc<dyn CardStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Top `limit` cards for `query`. Cards without an embedding are never candidates.
    pub async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<ScoredCard>> {
        let candidates = self.store.with_embeddings().await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;

        let ranked = rank(
            &query_vector,
            candidates.iter().enumerate().filter_map(|(idx, card)| {
                card.embedding
                    .as_deref()
                    .filter(|e| !e.is_empty())
                    .map(|e| (idx, e))
            }),
        )?;

        let mut slots: Vec<_> = candidates.into_iter().map(Some).collect();
        let hits: Vec<ScoredCard> = ranked
            .into_iter()
            .take(limit)
            .filter_map(|(idx, similarity)| {
                slots[idx].take().map(|card| ScoredCard { card, similarity })
            })
            .collect();

        info!(query, candidates = slots.len(), returned = hits.len(), "Semantic search completed");
        Ok(hits)
    }
}

/// One-paragraph explanation of why the top hits matched.
pub fn search_explanation(query: &str, hits: &[ScoredCard]) -> String {
    let Some(top) = hits.first().map(|h| &h.card) else {
        return "No cards found matching your query.".to_string();
    };

    let names: Vec<&str> = hits.iter().map(|h| h.card.name.as_str()).collect();
    let mut explanation = format!(
        "Found {} cards matching \"{}\": {}. ",
        hits.len(),
        query,
        names.join(", ")
    );

    let lowered = query.to_lowercase();
    if top.tags.iter().any(|t| t == "lounge") && lowered.contains("lounge") {
        explanation.push_str(&format!(
            "Top match {} offers {} domestic lounge visits per year. ",
            top.name,
            top.lounge_domestic_visits.unwrap_or(0)
        ));
    }
    if top.tier == Tier::Premium && lowered.contains("premium") {
        explanation.push_str(&format!(
            "{} is a premium card with high rewards and exclusive benefits. ",
            top.name
        ));
    }
    if top.annual_fee == 0 && lowered.contains("no fee") {
        explanation.push_str(&format!(
            "{} has no annual fee, making it great for first-time users. ",
            top.name
        ));
    }

    explanation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryCardStore;
    use crate::embeddings::EmbeddingError;
    use crate::models::testing::card;
    use crate::models::{NewCard, Tier};
    use async_trait::async_trait;

    const EPS: f32 = 1e-6;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(self.0.clone())
        }
    }

    fn new_card(name: &str, embedding: Option<Vec<f32>>) -> NewCard {
        let c = card(name, 0);
        let mut value = serde_json::to_value(&c).unwrap();
        value["embedding"] = serde_json::to_value(embedding).unwrap();
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_identical_vectors_score_one() {
        let a = [0.3, -1.2, 4.0, 0.01];
        assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        let score = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 2.5, 0.0]).unwrap();
        assert!(score.abs() < EPS);
    }

    #[test]
    fn test_opposite_vectors_score_minus_one() {
        let score = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap();
        assert!((score + 1.0).abs() < EPS);
    }

    #[test]
    fn test_zero_norm_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        assert_eq!(
            cosine_similarity(&[1.0, 2.0], &[1.0]),
            Err(VectorError::DimensionMismatch { left: 2, right: 1 })
        );

        let a = [1.0f32, 0.0];
        let b = [1.0f32];
        let candidates = vec![("a", &a[..]), ("b", &b[..])];
        assert!(rank(&[1.0, 0.0], candidates).is_err());
    }

    #[test]
    fn test_rank_orders_descending_and_keeps_ties_stable() {
        let vectors: Vec<(&str, Vec<f32>)> = vec![
            ("far", vec![0.0, 1.0]),
            ("tie-1", vec![1.0, 1.0]),
            ("exact", vec![1.0, 0.0]),
            ("tie-2", vec![2.0, 2.0]),
        ];
        let ranked = rank(&[1.0, 0.0], vectors.iter().map(|(k, v)| (*k, v.as_slice()))).unwrap();
        let order: Vec<_> = ranked.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, vec!["exact", "tie-1", "tie-2", "far"]);
    }

    #[test]
    fn test_rank_order_survives_monotonic_transform() {
        let vectors: Vec<Vec<f32>> = vec![
            vec![0.9, 0.1, 0.0],
            vec![0.1, 0.9, 0.3],
            vec![0.5, 0.5, 0.5],
            vec![-0.4, 0.2, 0.8],
        ];
        let query = [0.7, 0.2, 0.1];
        let ranked = rank(&query, vectors.iter().enumerate().map(|(i, v)| (i, v.as_slice()))).unwrap();

        let mut transformed: Vec<(usize, f32)> =
            ranked.iter().map(|(i, s)| (*i, (3.0 * s + 1.0).exp())).collect();
        transformed.sort_by(|a, b| b.1.total_cmp(&a.1));

        let before: Vec<_> = ranked.iter().map(|(i, _)| *i).collect();
        let after: Vec<_> = transformed.iter().map(|(i, _)| *i).collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_search_skips_cards_without_embeddings() {
        let store = Arc::new(MemoryCardStore::new());
        store.insert(new_card("Travel", Some(vec![1.0, 0.0]))).await.unwrap();
        store.insert(new_card("Shopping", Some(vec![0.0, 1.0]))).await.unwrap();
        store.insert(new_card("Unindexed", None)).await.unwrap();
        store.insert(new_card("Empty", Some(vec![]))).await.unwrap();

        let search = VectorSearch::new(store, Arc::new(FixedEmbedder(vec![1.0, 0.0])));
        let hits = search.search("airport lounges", 10).await.unwrap();

        let names: Vec<_> = hits.iter().map(|h| h.card.name.as_str()).collect();
        assert_eq!(names, vec!["Travel", "Shopping"]);
        assert!((hits[0].similarity - 1.0).abs() < EPS);
    }

    #[tokio::test]
    async fn test_search_truncates_to_limit() {
        let store = Arc::new(MemoryCardStore::new());
        for (i, name) in ["A", "B", "C"].iter().enumerate() {
            store
                .insert(new_card(name, Some(vec![1.0, i as f32])))
                .await
                .unwrap();
        }

        let search = VectorSearch::new(store, Arc::new(FixedEmbedder(vec![1.0, 0.0])));
        let hits = search.search("q", 2).await.unwrap();
        let names: Vec<_> = hits.iter().map(|h| h.card.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_explanation_mentions_top_card_details() {
        let mut top = card("Infinia", 0);
        top.tier = Tier::Premium;
        top.tags = vec!["lounge".into()];
        top.lounge_domestic_visits = Some(12);
        let other = card("Millennia", 1000);

        let hits = vec![
            ScoredCard { card: top, similarity: 0.9 },
            ScoredCard { card: other, similarity: 0.5 },
        ];
        let text = search_explanation("Premium LOUNGE card with no fee", &hits);

        assert!(text.starts_with(
            "Found 2 cards matching \"Premium LOUNGE card with no fee\": Infinia, Millennia. "
        ));
        assert!(text.contains("Top match Infinia offers 12 domestic lounge visits per year."));
        assert!(text.contains("Infinia is a premium card"));
        assert!(text.contains("Infinia has no annual fee"));
        assert_eq!(search_explanation("x", &[]), "No cards found matching your query.");
    }
}
