use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::payment::{StripePrice, StripeProduct};

/// Repository trait for the mirrored payment catalog
///
/// Upserts are keyed by the provider id; the local id of an existing row
/// is kept.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Returns the stored product and whether it was newly created
    async fn upsert_product(&self, product: &StripeProduct) -> RepositoryResult<(StripeProduct, bool)>;

    /// Returns whether the price was newly created
    async fn upsert_price(&self, price: &StripePrice) -> RepositoryResult<bool>;

    async fn find_product_by_stripe_id(&self, stripe_id: &str) -> RepositoryResult<Option<StripeProduct>>;

    async fn prices_for_product(&self, product_id: Uuid) -> RepositoryResult<Vec<StripePrice>>;
}
