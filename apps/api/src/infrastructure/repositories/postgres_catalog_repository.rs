use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::payment::{RecurringInterval, StripePrice, StripeProduct};
use crate::domain::repositories::{CatalogRepository, RepositoryResult};

/// PostgreSQL implementation of CatalogRepository
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    stripe_id: String,
    name: String,
    description: String,
    active: bool,
    metadata: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for StripeProduct {
    fn from(r: ProductRow) -> Self {
        StripeProduct {
            id: r.id,
            stripe_id: r.stripe_id,
            name: r.name,
            description: r.description,
            active: r.active,
            metadata: r.metadata,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UpsertedProduct {
    #[sqlx(flatten)]
    product: ProductRow,
    inserted: bool,
}

#[derive(sqlx::FromRow)]
struct PriceRow {
    id: Uuid,
    stripe_id: String,
    product_id: Uuid,
    currency: String,
    unit_amount: i64,
    active: bool,
    description: String,
    recurring_interval: Option<String>,
    recurring_interval_count: Option<i32>,
    metadata: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PriceRow> for StripePrice {
    fn from(r: PriceRow) -> Self {
        StripePrice {
            id: r.id,
            stripe_id: r.stripe_id,
            product_id: r.product_id,
            currency: r.currency,
            unit_amount: r.unit_amount,
            active: r.active,
            description: r.description,
            recurring_interval: r.recurring_interval.as_deref().and_then(RecurringInterval::parse),
            recurring_interval_count: r.recurring_interval_count,
            metadata: r.metadata,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, stripe_id, name, description, active, metadata, created_at, updated_at";

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn upsert_product(&self, product: &StripeProduct) -> RepositoryResult<(StripeProduct, bool)> {
        // xmax is zero only for rows this statement inserted
        let row = sqlx::query_as::<_, UpsertedProduct>(&format!(
            r#"
            INSERT INTO stripe_products (
                id, stripe_id, name, description, active, metadata, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (stripe_id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                active = EXCLUDED.active,
                metadata = EXCLUDED.metadata,
                updated_at = NOW()
            RETURNING {}, (xmax = 0) AS inserted
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product.id)
        .bind(&product.stripe_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.active)
        .bind(&product.metadata)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.product.into(), row.inserted))
    }

    async fn upsert_price(&self, price: &StripePrice) -> RepositoryResult<bool> {
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO stripe_prices (
                id, stripe_id, product_id, currency, unit_amount, active, description,
                recurring_interval, recurring_interval_count, metadata, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (stripe_id) DO UPDATE SET
                product_id = EXCLUDED.product_id,
                currency = EXCLUDED.currency,
                unit_amount = EXCLUDED.unit_amount,
                active = EXCLUDED.active,
                description = EXCLUDED.description,
                recurring_interval = EXCLUDED.recurring_interval,
                recurring_interval_count = EXCLUDED.recurring_interval_count,
                metadata = EXCLUDED.metadata,
                updated_at = NOW()
            RETURNING (xmax = 0)
            "#,
        )
        .bind(price.id)
        .bind(&price.stripe_id)
        .bind(price.product_id)
        .bind(&price.currency)
        .bind(price.unit_amount)
        .bind(price.active)
        .bind(&price.description)
        .bind(price.recurring_interval.map(|i| i.as_str()))
        .bind(price.recurring_interval_count)
        .bind(&price.metadata)
        .bind(price.created_at)
        .bind(price.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn find_product_by_stripe_id(&self, stripe_id: &str) -> RepositoryResult<Option<StripeProduct>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM stripe_products WHERE stripe_id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(stripe_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StripeProduct::from))
    }

    async fn prices_for_product(&self, product_id: Uuid) -> RepositoryResult<Vec<StripePrice>> {
        let rows = sqlx::query_as::<_, PriceRow>(
            r#"
            SELECT id, stripe_id, product_id, currency, unit_amount, active, description,
                   recurring_interval, recurring_interval_count, metadata, created_at, updated_at
            FROM stripe_prices
            WHERE product_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StripePrice::from).collect())
    }
}
