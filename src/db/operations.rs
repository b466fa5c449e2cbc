use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{health_check, CardFilter, CardStore, Page};
use crate::models::{CreditCard, NewCard};
use crate::types::{AppError, AppResult};

const CARD_COLUMNS: &str = "id, name, issuer, network, tier, annual_fee, fee_waiver, \
     fee_waiver_threshold, rewards_rates, fuel_surcharge_percentage, fuel_surcharge_max_cap, \
     lounge_domestic_visits, lounge_international_visits, lounge_min_spend_per_quarter, \
     welcome_offer, eligibility_min_monthly_income, eligibility_min_credit_score, \
     eligibility_nri, additional_perks, tags, description, apply_link, logo_url, embedding, \
     created_at, updated_at";

const HAS_EMBEDDING: &str = "embedding IS NOT NULL AND cardinality(embedding) > 0";

/// Postgres-backed catalog.
#[derive(Clone)]
pub struct PgCardStore {
    pool: PgPool,
}

impl PgCardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CardStore for PgCardStore {
    async fn list(&self, filter: &CardFilter, page: Page) -> AppResult<(Vec<CreditCard>, i64)> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {CARD_COLUMNS} FROM credit_cards"));
        filter.push_where(&mut qb);
        qb.push(" ORDER BY name ASC, id ASC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
        let cards = qb
            .build_query_as::<CreditCard>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM credit_cards");
        filter.push_where(&mut count_qb);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((cards, total))
    }

    async fn get(&self, id: &str) -> AppResult<Option<CreditCard>> {
        let card = sqlx::query_as::<_, CreditCard>(&format!(
            "SELECT {CARD_COLUMNS} FROM credit_cards WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    async fn get_many(&self, ids: &[String]) -> AppResult<Vec<CreditCard>> {
        let cards = sqlx::query_as::<_, CreditCard>(&format!(
            "SELECT {CARD_COLUMNS} FROM credit_cards WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credit_cards")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn with_embeddings(&self) -> AppResult<Vec<CreditCard>> {
        let cards = sqlx::query_as::<_, CreditCard>(&format!(
            "SELECT {CARD_COLUMNS} FROM credit_cards WHERE {HAS_EMBEDDING} ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    async fn missing_embeddings(&self) -> AppResult<Vec<CreditCard>> {
        let cards = sqlx::query_as::<_, CreditCard>(&format!(
            "SELECT {CARD_COLUMNS} FROM credit_cards WHERE NOT ({HAS_EMBEDDING}) ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    async fn set_embedding(&self, id: &str, embedding: &[f32]) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE credit_cards
            SET embedding = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(embedding)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Card {id} not found")));
        }
        Ok(())
    }

    async fn insert(&self, card: NewCard) -> AppResult<CreditCard> {
        let card = card.into_card(Uuid::new_v4().to_string(), Utc::now());

        let inserted = sqlx::query_as::<_, CreditCard>(&format!(
            r#"
            INSERT INTO credit_cards (
                id, name, issuer, network, tier, annual_fee, fee_waiver, fee_waiver_threshold,
                rewards_rates, fuel_surcharge_percentage, fuel_surcharge_max_cap,
                lounge_domestic_visits, lounge_international_visits, lounge_min_spend_per_quarter,
                welcome_offer, eligibility_min_monthly_income, eligibility_min_credit_score,
                eligibility_nri, additional_perks, tags, description, apply_link, logo_url,
                embedding, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
            RETURNING {CARD_COLUMNS}
            "#
        ))
        .bind(&card.id)
        .bind(&card.name)
        .bind(card.issuer)
        .bind(card.network)
        .bind(card.tier)
        .bind(card.annual_fee)
        .bind(card.fee_waiver)
        .bind(card.fee_waiver_threshold)
        .bind(Json(&card.rewards_rates))
        .bind(card.fuel_surcharge_percentage)
        .bind(card.fuel_surcharge_max_cap)
        .bind(card.lounge_domestic_visits)
        .bind(card.lounge_international_visits)
        .bind(card.lounge_min_spend_per_quarter)
        .bind(&card.welcome_offer)
        .bind(card.eligibility_min_monthly_income)
        .bind(card.eligibility_min_credit_score)
        .bind(card.eligibility_nri)
        .bind(&card.additional_perks)
        .bind(&card.tags)
        .bind(&card.description)
        .bind(&card.apply_link)
        .bind(&card.logo_url)
        .bind(&card.embedding)
        .bind(card.created_at)
        .bind(card.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn ping(&self) -> AppResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }
}
