//! Stripe REST client.
//!
//! Requests are form-encoded and authenticated with the secret key as a
//! bearer token. List endpoints are paged with `starting_after` until
//! `has_more` is false.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{
    CheckoutRequest, CheckoutSession, LineItem, PaymentError, PaymentGateway, RemotePrice,
    RemoteProduct,
};

const PAGE_SIZE: &str = "100";

pub struct StripeClient {
    client: Client,
    api_base: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

trait HasId {
    fn id(&self) -> &str;
}

impl HasId for RemoteProduct {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for RemotePrice {
    fn id(&self) -> &str {
        &self.id
    }
}

impl StripeClient {
    /// Creates a client against `api_base` (normally `https://api.stripe.com`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_base: &str, secret_key: &str) -> Result<Self, PaymentError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_base, path)
    }

    async fn send<T: DeserializeOwned + Send>(&self, request: RequestBuilder) -> Result<T, PaymentError> {
        let response = request.bearer_auth(&self.secret_key).send().await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| PaymentError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        Err(PaymentError::Provider {
            status: status.as_u16(),
            message,
        })
    }

    async fn list_all<T>(&self, path: &str, filters: &[(&str, &str)]) -> Result<Vec<T>, PaymentError>
    where
        T: DeserializeOwned + HasId + Send,
    {
        let mut items: Vec<T> = Vec::new();
        loop {
            let mut query: Vec<(&str, &str)> = filters.to_vec();
            query.push(("limit", PAGE_SIZE));
            let cursor = items.last().map(|item| item.id().to_string());
            if let Some(cursor) = cursor.as_deref() {
                query.push(("starting_after", cursor));
            }

            let page: ListResponse<T> = self.send(self.client.get(self.url(path)).query(&query)).await?;
            let done = !page.has_more || page.data.is_empty();
            items.extend(page.data);
            if done {
                return Ok(items);
            }
        }
    }
}

/// Flattens a checkout request into Stripe's bracketed form keys
pub(crate) fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        ("payment_method_types[0]".into(), "card".into()),
        ("success_url".into(), request.success_url.clone()),
        ("cancel_url".into(), request.cancel_url.clone()),
        ("line_items[0][quantity]".into(), "1".into()),
    ];

    match &request.line_item {
        LineItem::Catalog { price_id } => {
            form.push(("line_items[0][price]".into(), price_id.clone()));
        }
        LineItem::Inline {
            currency,
            unit_amount,
            name,
            description,
        } => {
            let key = |k: &str| format!("line_items[0][price_data]{}", k);
            form.push((key("[currency]"), currency.clone()));
            form.push((key("[unit_amount]"), unit_amount.to_string()));
            form.push((key("[product_data][name]"), name.clone()));
            if !description.is_empty() {
                form.push((key("[product_data][description]"), description.clone()));
            }
        }
    }

    if let Some(email) = &request.customer_email {
        form.push(("customer_email".into(), email.clone()));
    }

    let mut metadata: Vec<(&String, &String)> = request.metadata.iter().collect();
    metadata.sort();
    for (key, value) in metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }

    form
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let form = checkout_form(request);
        self.send(self.client.post(self.url("checkout/sessions")).form(&form))
            .await
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError> {
        let path = format!("checkout/sessions/{}", session_id);
        self.send(self.client.get(self.url(&path))).await
    }

    async fn list_active_products(&self) -> Result<Vec<RemoteProduct>, PaymentError> {
        self.list_all("products", &[("active", "true")]).await
    }

    async fn list_active_prices(&self, product_id: &str) -> Result<Vec<RemotePrice>, PaymentError> {
        self.list_all("prices", &[("active", "true"), ("product", product_id)])
            .await
    }
}
