use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Local mirror of a payment-provider product
#[derive(Debug, Clone, Serialize)]
pub struct StripeProduct {
    pub id: Uuid,
    pub stripe_id: String,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Billing period of a recurring price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringInterval {
    Day,
    Week,
    Month,
    Year,
}

impl RecurringInterval {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Local mirror of a payment-provider price
#[derive(Debug, Clone, Serialize)]
pub struct StripePrice {
    pub id: Uuid,
    pub stripe_id: String,
    pub product_id: Uuid,
    pub currency: String,
    /// Amount in the currency's minor unit (cents)
    pub unit_amount: i64,
    pub active: bool,
    pub description: String,
    pub recurring_interval: Option<RecurringInterval>,
    pub recurring_interval_count: Option<i32>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StripePrice {
    pub fn is_recurring(&self) -> bool {
        self.recurring_interval.is_some()
    }

    /// Whether the price's `is_member` metadata matches the membership flag
    ///
    /// Comparison is case-insensitive, so "True" and "true" both match members.
    pub fn matches_membership(&self, is_member: bool) -> bool {
        self.metadata
            .get("is_member")
            .and_then(Value::as_str)
            .is_some_and(|v| v.eq_ignore_ascii_case(&is_member.to_string()))
    }
}

impl fmt::Display for StripePrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = Decimal::new(self.unit_amount, 2);
        match self.recurring_interval {
            Some(interval) => write!(f, "{} {} / {}", self.currency, amount, interval.as_str()),
            None => write!(f, "{} {} (one-time)", self.currency, amount),
        }
    }
}

/// First active price whose membership metadata matches
pub fn select_price_for_membership(prices: &[StripePrice], is_member: bool) -> Option<&StripePrice> {
    prices
        .iter()
        .filter(|p| p.active)
        .find(|p| p.matches_membership(is_member))
}

/// Converts a decimal amount to minor units, rounding half away from zero
pub fn to_minor_units(amount: Decimal) -> DomainResult<i64> {
    if amount < Decimal::ZERO {
        return Err(DomainError::validation("Amount cannot be negative"));
    }
    (amount * Decimal::new(100, 0))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| DomainError::validation("Amount is too large"))
}
