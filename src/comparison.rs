//! Side-by-side card comparison.
//!
//! Four extremal picks, each a fold that only replaces the current pick on a strict
//! improvement, so the earliest card wins ties.

use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use crate::models::CreditCard;

pub const MIN_COMPARE: usize = 2;
pub const MAX_COMPARE: usize = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ComparisonError {
    #[error("between 2 and 5 cards can be compared, got {0}")]
    CardCount(usize),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonInsights<'a> {
    pub lowest_annual_fee: &'a CreditCard,
    pub highest_rewards: &'a CreditCard,
    pub best_lounge_access: &'a CreditCard,
    pub most_affordable: &'a CreditCard,
    pub summary: Vec<String>,
}

/// First card whose key is strictly `wanted` relative to every earlier pick.
fn pick<'a, K, F>(cards: &'a [CreditCard], key: F, wanted: Ordering) -> &'a CreditCard
where
    K: PartialOrd,
    F: Fn(&CreditCard) -> K,
{
    let mut best = &cards[0];
    let mut best_key = key(best);
    for card in &cards[1..] {
        let k = key(card);
        if k.partial_cmp(&best_key) == Some(wanted) {
            best = card;
            best_key = k;
        }
    }
    best
}

pub fn compare(cards: &[CreditCard]) -> Result<ComparisonInsights<'_>, ComparisonError> {
    if !(MIN_COMPARE..=MAX_COMPARE).contains(&cards.len()) {
        return Err(ComparisonError::CardCount(cards.len()));
    }

    let lowest_annual_fee = pick(cards, |c| c.annual_fee, Ordering::Less);
    let highest_rewards = pick(cards, CreditCard::dining_rate, Ordering::Greater);
    let best_lounge_access = pick(cards, |c| c.lounge_domestic_visits.unwrap_or(0), Ordering::Greater);
    let most_affordable = pick(cards, |c| c.eligibility_min_monthly_income, Ordering::Less);

    let mut summary = vec![
        format!(
            "{} has the lowest annual fee at ₹{}",
            lowest_annual_fee.name, lowest_annual_fee.annual_fee
        ),
        format!(
            "{} offers the highest dining rewards at {}%",
            highest_rewards.name,
            highest_rewards.dining_rate()
        ),
    ];

    let lounge_visits = best_lounge_access.lounge_domestic_visits.unwrap_or(0);
    if lounge_visits > 0 {
        summary.push(format!(
            "{} provides the best lounge access with {} domestic visits",
            best_lounge_access.name, lounge_visits
        ));
    }

    summary.push(format!(
        "{} has the lowest income requirement at ₹{}",
        most_affordable.name,
        group_thousands(most_affordable.eligibility_min_monthly_income.into())
    ));

    Ok(ComparisonInsights {
        lowest_annual_fee,
        highest_rewards,
        best_lounge_access,
        most_affordable,
        summary,
    })
}

/// `1234567` -> `"1,234,567"`
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::card;

    #[test]
    fn test_lowest_fee_picks_the_free_card() {
        let cards = vec![card("Free", 0), card("Paid", 500)];
        let insights = compare(&cards).unwrap();
        assert_eq!(insights.lowest_annual_fee.name, "Free");
        assert_eq!(insights.summary[0], "Free has the lowest annual fee at ₹0");
    }

    #[test]
    fn test_ties_go_to_the_first_card() {
        let mut a = card("A", 500);
        let mut b = card("B", 500);
        a.rewards_rates.insert("dining".into(), 2.0);
        b.rewards_rates.insert("dining".into(), 2.0);
        a.lounge_domestic_visits = Some(4);
        b.lounge_domestic_visits = Some(4);

        let cards = vec![a, b];
        let insights = compare(&cards).unwrap();
        assert_eq!(insights.lowest_annual_fee.name, "A");
        assert_eq!(insights.highest_rewards.name, "A");
        assert_eq!(insights.best_lounge_access.name, "A");
        assert_eq!(insights.most_affordable.name, "A");
    }

    #[test]
    fn test_strict_improvement_replaces_pick() {
        let mut a = card("A", 1000);
        let mut b = card("B", 250);
        let mut c = card("C", 250);
        a.eligibility_min_monthly_income = 50_000;
        b.eligibility_min_monthly_income = 100_000;
        c.eligibility_min_monthly_income = 35_000;
        c.rewards_rates.insert("dining".into(), 3.3);
        b.lounge_domestic_visits = Some(8);

        let cards = vec![a, b, c];
        let insights = compare(&cards).unwrap();
        assert_eq!(insights.lowest_annual_fee.name, "B");
        assert_eq!(insights.highest_rewards.name, "C");
        assert_eq!(insights.best_lounge_access.name, "B");
        assert_eq!(insights.most_affordable.name, "C");
        assert_eq!(
            insights.summary,
            vec![
                "B has the lowest annual fee at ₹250".to_string(),
                "C offers the highest dining rewards at 3.3%".to_string(),
                "B provides the best lounge access with 8 domestic visits".to_string(),
                "C has the lowest income requirement at ₹35,000".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_values_count_as_zero() {
        let mut a = card("A", 0);
        let b = card("B", 0);
        a.rewards_rates.insert("travel".into(), 5.0);

        let cards = vec![a, b];
        let insights = compare(&cards).unwrap();
        assert_eq!(insights.highest_rewards.name, "A");
        assert_eq!(insights.summary[1], "A offers the highest dining rewards at 0%");
    }

    #[test]
    fn test_no_lounge_line_without_lounge_access() {
        let mut a = card("A", 0);
        let mut b = card("B", 100);
        a.lounge_domestic_visits = Some(0);
        b.lounge_domestic_visits = Some(0);

        let cards = vec![a, b];
        let insights = compare(&cards).unwrap();
        assert_eq!(insights.summary.len(), 3);
        assert!(insights.summary.iter().all(|s| !s.contains("lounge")));
    }

    #[test]
    fn test_card_count_bounds() {
        let one = vec![card("A", 0)];
        assert_eq!(compare(&one).unwrap_err(), ComparisonError::CardCount(1));

        let six: Vec<_> = (0..6).map(|i| card(&format!("C{i}"), i)).collect();
        assert_eq!(compare(&six).unwrap_err(), ComparisonError::CardCount(6));

        let five: Vec<_> = (0..5).map(|i| card(&format!("C{i}"), i)).collect();
        assert!(compare(&five).is_ok());
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(25_000), "25,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-1_000), "-1,000");
    }

    #[test]
    fn test_insights_serialize_camel_case() {
        let cards = vec![card("A", 0), card("B", 10)];
        let value = serde_json::to_value(compare(&cards).unwrap()).unwrap();
        assert_eq!(value["lowestAnnualFee"]["name"], "A");
        assert!(value["summary"].is_array());
    }
}
