use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CardFilter, CardStore, Page};
use crate::models::{CreditCard, NewCard};
use crate::types::{AppError, AppResult};

/// In-process catalog for `serve --memory` and tests.
#[derive(Clone, Default)]
pub struct MemoryCardStore {
    inner: Arc<RwLock<Vec<CreditCard>>>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

fn sorted_by_name(mut cards: Vec<CreditCard>) -> Vec<CreditCard> {
    cards.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    cards
}

#[async_trait]
impl CardStore for MemoryCardStore {
    async fn list(&self, filter: &CardFilter, page: Page) -> AppResult<(Vec<CreditCard>, i64)> {
        let guard = self.inner.read().await;
        let matching: Vec<CreditCard> = guard.iter().filter(|c| filter.matches(c)).cloned().collect();
        drop(guard);

        let total = matching.len() as i64;
        let data = sorted_by_name(matching)
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect();

        Ok((data, total))
    }

    async fn get(&self, id: &str) -> AppResult<Option<CreditCard>> {
        let guard = self.inner.read().await;
        Ok(guard.iter().find(|c| c.id == id).cloned())
    }

    async fn get_many(&self, ids: &[String]) -> AppResult<Vec<CreditCard>> {
        let guard = self.inner.read().await;
        Ok(guard.iter().filter(|c| ids.contains(&c.id)).cloned().collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.len() as i64)
    }

    async fn with_embeddings(&self) -> AppResult<Vec<CreditCard>> {
        let guard = self.inner.read().await;
        let cards = guard.iter().filter(|c| c.has_embedding()).cloned().collect();
        Ok(sorted_by_name(cards))
    }

    async fn missing_embeddings(&self) -> AppResult<Vec<CreditCard>> {
        let guard = self.inner.read().await;
        let cards = guard.iter().filter(|c| !c.has_embedding()).cloned().collect();
        Ok(sorted_by_name(cards))
    }

    async fn set_embedding(&self, id: &str, embedding: &[f32]) -> AppResult<()> {
        let mut guard = self.inner.write().await;
        let card = guard
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Card {id} not found")))?;
        card.embedding = Some(embedding.to_vec());
        card.updated_at = Utc::now();
        Ok(())
    }

    async fn insert(&self, card: NewCard) -> AppResult<CreditCard> {
        let card = card.into_card(Uuid::new_v4().to_string(), Utc::now());
        let mut guard = self.inner.write().await;
        guard.push(card.clone());
        Ok(card)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
