//! Mirrors the provider's active products and prices locally.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::ServiceResult;
use crate::domain::payment::{RecurringInterval, StripePrice, StripeProduct};
use crate::infrastructure::payments::{RemotePrice, RemoteProduct};
use crate::state::AppState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub products_created: usize,
    pub prices_created: usize,
}

fn metadata_value(metadata: &HashMap<String, String>) -> Value {
    Value::Object(
        metadata
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

fn product_from_remote(remote: &RemoteProduct) -> StripeProduct {
    let now = Utc::now();
    StripeProduct {
        id: Uuid::new_v4(),
        stripe_id: remote.id.clone(),
        name: remote.name.clone(),
        description: remote.description.clone().unwrap_or_default(),
        active: remote.active,
        metadata: metadata_value(&remote.metadata),
        created_at: now,
        updated_at: now,
    }
}

/// `None` for prices without a fixed amount (tiered or metered)
fn price_from_remote(remote: &RemotePrice, product_id: Uuid) -> Option<StripePrice> {
    let unit_amount = remote.unit_amount?;
    let now = Utc::now();
    let recurring = remote.recurring.as_ref();
    Some(StripePrice {
        id: Uuid::new_v4(),
        stripe_id: remote.id.clone(),
        product_id,
        currency: remote.currency.clone(),
        unit_amount,
        active: remote.active,
        description: remote.nickname.clone().unwrap_or_default(),
        recurring_interval: recurring.and_then(|r| RecurringInterval::parse(&r.interval)),
        recurring_interval_count: recurring.map(|r| r.interval_count),
        metadata: metadata_value(&remote.metadata),
        created_at: now,
        updated_at: now,
    })
}

pub async fn sync_catalog(state: &AppState) -> ServiceResult<SyncReport> {
    let mut report = SyncReport::default();

    for remote in state.payments.list_active_products().await? {
        let (product, created) = state.catalog.upsert_product(&product_from_remote(&remote)).await?;
        if created {
            report.products_created += 1;
        }

        for remote_price in state.payments.list_active_prices(&remote.id).await? {
            let Some(price) = price_from_remote(&remote_price, product.id) else {
                tracing::debug!(price = %remote_price.id, "skipping price without unit amount");
                continue;
            };
            if state.catalog.upsert_price(&price).await? {
                report.prices_created += 1;
            }
        }
    }

    tracing::info!(
        event = "catalog.synced",
        products_created = report.products_created,
        prices_created = report.prices_created,
        "payment catalog synced"
    );
    Ok(report)
}
