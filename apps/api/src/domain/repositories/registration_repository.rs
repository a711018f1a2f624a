use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::player::Player;
use crate::domain::registration::{PaymentStatus, Registration, RegistrationFilter, RegistrationSummary};

/// Repository trait for league registrations
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Insert; one registration per player and league, one per checkout session
    async fn create(&self, registration: &Registration) -> RepositoryResult<()>;

    /// Insert the player and its registration together; neither is kept
    /// when the registration conflicts
    async fn create_with_player(&self, player: &Player, registration: &Registration) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Registration>>;

    async fn find_by_checkout_session(&self, session_id: &str) -> RepositoryResult<Option<Registration>>;

    async fn update_status(&self, id: Uuid, status: PaymentStatus) -> RepositoryResult<()>;

    /// Joined rows for management views, in no particular order
    async fn summaries(&self, filter: &RegistrationFilter) -> RepositoryResult<Vec<RegistrationSummary>>;
}
