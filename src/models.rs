use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::CardStore;
use crate::embeddings::Embedder;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CardStore>,
    pub embedder: Arc<dyn Embedder>,
    pub config: Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "card_issuer", rename_all = "UPPERCASE")]
pub enum Issuer {
    Hdfc,
    Axis,
    Icici,
    Sbi,
    Kotak,
    Other,
}

impl std::fmt::Display for Issuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Issuer::Hdfc => write!(f, "HDFC"),
            Issuer::Axis => write!(f, "AXIS"),
            Issuer::Icici => write!(f, "ICICI"),
            Issuer::Sbi => write!(f, "SBI"),
            Issuer::Kotak => write!(f, "KOTAK"),
            Issuer::Other => write!(f, "OTHER"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "card_network", rename_all = "UPPERCASE")]
pub enum Network {
    Visa,
    Mastercard,
    Rupay,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Visa => write!(f, "VISA"),
            Network::Mastercard => write!(f, "MASTERCARD"),
            Network::Rupay => write!(f, "RUPAY"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "card_tier", rename_all = "UPPERCASE")]
pub enum Tier {
    Entry,
    Mid,
    Premium,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Entry => write!(f, "ENTRY"),
            Tier::Mid => write!(f, "MID"),
            Tier::Premium => write!(f, "PREMIUM"),
        }
    }
}

/// A catalog entry as stored in `credit_cards`.
///
/// Amounts are whole rupees. `embedding` is only populated once the backfill has run
/// for the card and is never sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: String,
    pub name: String,
    pub issuer: Issuer,
    pub network: Network,
    pub tier: Tier,
    pub annual_fee: i32,
    pub fee_waiver: bool,
    pub fee_waiver_threshold: Option<i32>,
    #[sqlx(json)]
    pub rewards_rates: BTreeMap<String, f64>,
    pub fuel_surcharge_percentage: Option<f64>,
    pub fuel_surcharge_max_cap: Option<i32>,
    pub lounge_domestic_visits: Option<i32>,
    pub lounge_international_visits: Option<i32>,
    pub lounge_min_spend_per_quarter: Option<i32>,
    pub welcome_offer: Option<String>,
    pub eligibility_min_monthly_income: i32,
    pub eligibility_min_credit_score: i32,
    pub eligibility_nri: bool,
    pub additional_perks: Vec<String>,
    pub tags: Vec<String>,
    pub description: String,
    pub apply_link: String,
    pub logo_url: Option<String>,
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreditCard {
    pub fn has_embedding(&self) -> bool {
        self.embedding.as_ref().is_some_and(|e| !e.is_empty())
    }

    pub fn dining_rate(&self) -> f64 {
        self.rewards_rates.get("dining").copied().unwrap_or(0.0)
    }

    /// Text fed to the embedding model for this card.
    pub fn embedding_text(&self) -> String {
        format!(
            "{}. {}. Issuer: {}, Tier: {}, Tags: {}, Perks: {}",
            self.name,
            self.description,
            self.issuer,
            self.tier,
            self.tags.join(", "),
            self.additional_perks.join(", ")
        )
    }
}

/// Import shape for the seed file; everything except identity and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub name: String,
    pub issuer: Issuer,
    pub network: Network,
    pub tier: Tier,
    pub annual_fee: i32,
    #[serde(default)]
    pub fee_waiver: bool,
    pub fee_waiver_threshold: Option<i32>,
    #[serde(default)]
    pub rewards_rates: BTreeMap<String, f64>,
    pub fuel_surcharge_percentage: Option<f64>,
    pub fuel_surcharge_max_cap: Option<i32>,
    pub lounge_domestic_visits: Option<i32>,
    pub lounge_international_visits: Option<i32>,
    pub lounge_min_spend_per_quarter: Option<i32>,
    pub welcome_offer: Option<String>,
    pub eligibility_min_monthly_income: i32,
    pub eligibility_min_credit_score: i32,
    #[serde(default)]
    pub eligibility_nri: bool,
    #[serde(default)]
    pub additional_perks: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: String,
    pub apply_link: String,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl NewCard {
    pub fn into_card(self, id: String, now: DateTime<Utc>) -> CreditCard {
        // tags behave as a set
        let mut tags = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        CreditCard {
            id,
            name: self.name,
            issuer: self.issuer,
            network: self.network,
            tier: self.tier,
            annual_fee: self.annual_fee,
            fee_waiver: self.fee_waiver,
            fee_waiver_threshold: self.fee_waiver_threshold,
            rewards_rates: self.rewards_rates,
            fuel_surcharge_percentage: self.fuel_surcharge_percentage,
            fuel_surcharge_max_cap: self.fuel_surcharge_max_cap,
            lounge_domestic_visits: self.lounge_domestic_visits,
            lounge_international_visits: self.lounge_international_visits,
            lounge_min_spend_per_quarter: self.lounge_min_spend_per_quarter,
            welcome_offer: self.welcome_offer,
            eligibility_min_monthly_income: self.eligibility_min_monthly_income,
            eligibility_min_credit_score: self.eligibility_min_credit_score,
            eligibility_nri: self.eligibility_nri,
            additional_perks: self.additional_perks,
            tags,
            description: self.description,
            apply_link: self.apply_link,
            logo_url: self.logo_url,
            embedding: self.embedding,
            created_at: now,
            updated_at: now,
        }
    }
}

// API Request/Response types

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct CardListResponse {
    pub data: Vec<CreditCard>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, validator::Validate)]
pub struct SearchRequest {
    pub query: String,
    #[validate(range(min = 1, max = 50, message = "limit must be between 1 and 50"))]
    pub limit: Option<usize>,
}

/// A search hit: the card plus its cosine similarity to the query.
#[derive(Debug, Serialize)]
pub struct ScoredCard {
    #[serde(flatten)]
    pub card: CreditCard,
    pub similarity: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<ScoredCard>,
    pub explanation: String,
    pub total_found: usize,
}

#[derive(Debug, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    #[validate(length(
        min = 2,
        max = 5,
        message = "cardIds must contain between 2 and 5 card IDs"
    ))]
    pub card_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: String,
}
