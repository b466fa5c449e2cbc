//! Typed card filter
//!
//! One field per supported predicate. The Postgres store renders it into a `WHERE`
//! clause, the in-memory store evaluates it with [`CardFilter::matches`]; both must agree.

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::models::{CreditCard, Issuer, Network, Tier};
use crate::types::{AppError, AppResult};

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardFilter {
    pub issuer: Option<Issuer>,
    pub network: Option<Network>,
    pub tier: Option<Tier>,
    /// Inclusive bounds on `annual_fee`.
    pub annual_fee_min: Option<i32>,
    pub annual_fee_max: Option<i32>,
    /// Inclusive bounds on `eligibility_min_credit_score`.
    pub credit_score_min: Option<i32>,
    pub credit_score_max: Option<i32>,
    /// `lounge_domestic_visits > 0`
    pub has_lounge_access: bool,
    /// `fuel_surcharge_percentage > 0`
    pub has_fuel_surcharge: bool,
    /// Card must carry at least one of these tags.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Raw `GET /api/cards` query string.
///
/// `tags` is filled from the raw pairs by [`CardQuery::with_tags`]; it may repeat or
/// arrive as `tags[]`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardQuery {
    pub issuer: Option<Issuer>,
    pub network: Option<Network>,
    pub tier: Option<Tier>,
    pub annual_fee_min: Option<i32>,
    pub annual_fee_max: Option<i32>,
    pub min_credit_score: Option<i32>,
    pub max_credit_score: Option<i32>,
    pub has_lounge_access: Option<bool>,
    pub has_fuel_surcharge: Option<bool>,
    #[serde(skip)]
    pub tags: Vec<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl CardQuery {
    /// Collects `tags` and `tags[]` values, each of which may itself be comma-separated.
    pub fn with_tags<'a, I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in pairs {
            if key != "tags" && key != "tags[]" {
                continue;
            }
            for tag in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                if !self.tags.iter().any(|t| t == tag) {
                    self.tags.push(tag.to_string());
                }
            }
        }
        self
    }

    pub fn into_parts(self) -> AppResult<(CardFilter, Page)> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(AppError::InvalidRequest(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::InvalidRequest(
                "offset must not be negative".to_string(),
            ));
        }

        let filter = CardFilter {
            issuer: self.issuer,
            network: self.network,
            tier: self.tier,
            annual_fee_min: self.annual_fee_min,
            annual_fee_max: self.annual_fee_max,
            credit_score_min: self.min_credit_score,
            credit_score_max: self.max_credit_score,
            has_lounge_access: self.has_lounge_access.unwrap_or(false),
            has_fuel_surcharge: self.has_fuel_surcharge.unwrap_or(false),
            tags: self.tags,
        };

        Ok((filter, Page { limit, offset }))
    }
}

impl CardFilter {
    pub fn matches(&self, card: &CreditCard) -> bool {
        if self.issuer.is_some_and(|issuer| card.issuer != issuer)
            || self.network.is_some_and(|network| card.network != network)
            || self.tier.is_some_and(|tier| card.tier != tier)
        {
            return false;
        }
        if self.annual_fee_min.is_some_and(|min| card.annual_fee < min)
            || self.annual_fee_max.is_some_and(|max| card.annual_fee > max)
        {
            return false;
        }
        let score = card.eligibility_min_credit_score;
        if self.credit_score_min.is_some_and(|min| score < min)
            || self.credit_score_max.is_some_and(|max| score > max)
        {
            return false;
        }
        if self.has_lounge_access && card.lounge_domestic_visits.unwrap_or(0) <= 0 {
            return false;
        }
        if self.has_fuel_surcharge && card.fuel_surcharge_percentage.unwrap_or(0.0) <= 0.0 {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| card.tags.contains(t)) {
            return false;
        }
        true
    }

    /// Appends ` WHERE ...` for this filter.
    pub fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        qb.push(" WHERE TRUE");

        if let Some(issuer) = self.issuer {
            qb.push(" AND issuer = ").push_bind(issuer);
        }
        if let Some(network) = self.network {
            qb.push(" AND network = ").push_bind(network);
        }
        if let Some(tier) = self.tier {
            qb.push(" AND tier = ").push_bind(tier);
        }
        if let Some(min) = self.annual_fee_min {
            qb.push(" AND annual_fee >= ").push_bind(min);
        }
        if let Some(max) = self.annual_fee_max {
            qb.push(" AND annual_fee <= ").push_bind(max);
        }
        if let Some(min) = self.credit_score_min {
            qb.push(" AND eligibility_min_credit_score >= ").push_bind(min);
        }
        if let Some(max) = self.credit_score_max {
            qb.push(" AND eligibility_min_credit_score <= ").push_bind(max);
        }
        if self.has_lounge_access {
            qb.push(" AND lounge_domestic_visits > 0");
        }
        if self.has_fuel_surcharge {
            qb.push(" AND fuel_surcharge_percentage > 0");
        }
        if !self.tags.is_empty() {
            qb.push(" AND tags && ").push_bind(self.tags.clone());
        }
    }
}
