// Payment provider port and its Stripe adapter

pub mod stripe;

pub use stripe::StripeClient;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Failure talking to the payment provider
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Unexpected payment provider response: {0}")]
    Decode(String),
}

/// What a checkout session charges for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItem {
    /// A price already defined in the provider's catalog
    Catalog { price_id: String },
    /// An ad-hoc price in minor units
    Inline {
        currency: String,
        unit_amount: i64,
        name: String,
        description: String,
    },
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub line_item: LineItem,
    pub metadata: HashMap<String, String>,
    pub customer_email: Option<String>,
    /// Must contain the `{CHECKOUT_SESSION_ID}` placeholder
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    pub payment_status: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub active: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRecurring {
    pub interval: String,
    pub interval_count: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemotePrice {
    pub id: String,
    pub product: String,
    pub currency: String,
    #[serde(default)]
    pub unit_amount: Option<i64>,
    pub active: bool,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub recurring: Option<RemoteRecurring>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Port to the hosted checkout and product catalog
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError>;

    async fn list_active_products(&self) -> Result<Vec<RemoteProduct>, PaymentError>;

    async fn list_active_prices(&self, product_id: &str) -> Result<Vec<RemotePrice>, PaymentError>;
}
