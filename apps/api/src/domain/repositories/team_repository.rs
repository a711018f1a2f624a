use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::team::{SignupCode, Team, TeamCaptain};
use crate::domain::user::Email;

/// Admin listing filter; `search` matches team names case-insensitively
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamFilter {
    pub league: Option<Uuid>,
    pub division: Option<Uuid>,
    pub search: Option<String>,
}

impl TeamFilter {
    /// Lowercased search text, `None` when blank
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }
}

/// Repository trait for Team aggregate and team captains
///
/// Defines the contract for persisting and retrieving teams.
/// Implementations should handle database-specific details.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Save a team (insert or update)
    async fn save(&self, team: &Team) -> RepositoryResult<()>;

    /// Find a team by its ID
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>>;

    async fn find_by_signup_code(&self, code: &SignupCode) -> RepositoryResult<Option<Team>>;

    async fn signup_code_exists(&self, code: &SignupCode) -> RepositoryResult<bool>;

    /// Teams matching the filter, ordered by league name, division name, team name
    async fn list(&self, filter: &TeamFilter) -> RepositoryResult<Vec<Team>>;

    /// Teams in a division ordered by name
    async fn find_by_division(&self, division_id: Uuid) -> RepositoryResult<Vec<Team>>;

    /// Teams whose captain is linked to the user, ordered by name
    async fn find_by_captain_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Team>>;

    /// Teams whose unlinked, non-system captain carries this email
    async fn find_claimable(&self, email: &Email) -> RepositoryResult<Vec<Team>>;

    /// Delete a team by ID
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;

    /// Save a captain (insert or update)
    async fn save_captain(&self, captain: &TeamCaptain) -> RepositoryResult<()>;

    async fn find_captain(&self, id: Uuid) -> RepositoryResult<Option<TeamCaptain>>;

    async fn find_captain_by_email(&self, email: &Email) -> RepositoryResult<Option<TeamCaptain>>;

    async fn find_system_captain(&self) -> RepositoryResult<Option<TeamCaptain>>;

    /// Whether a captain is linked to the user or, unlinked, carries the email
    async fn is_captain(&self, user_id: Uuid, email: &Email) -> RepositoryResult<bool>;
}
