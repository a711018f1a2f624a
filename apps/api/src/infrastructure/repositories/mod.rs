// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod memory;
pub mod postgres_catalog_repository;
pub mod postgres_form_repository;
pub mod postgres_invitation_repository;
pub mod postgres_league_repository;
pub mod postgres_player_repository;
pub mod postgres_registration_repository;
pub mod postgres_team_repository;
pub mod postgres_user_repository;

pub use memory::InMemoryStore;
pub use postgres_catalog_repository::PostgresCatalogRepository;
pub use postgres_form_repository::PostgresFormRepository;
pub use postgres_invitation_repository::PostgresInvitationRepository;
pub use postgres_league_repository::PostgresLeagueRepository;
pub use postgres_player_repository::PostgresPlayerRepository;
pub use postgres_registration_repository::PostgresRegistrationRepository;
pub use postgres_team_repository::PostgresTeamRepository;
pub use postgres_user_repository::PostgresUserRepository;

use crate::domain::repositories::RepositoryError;

const UNIQUE_VIOLATION: &str = "23505";

/// Maps a unique-constraint violation to `Conflict`, anything else to `Database`
pub(crate) fn unique_violation(message: &'static str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |err| match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            RepositoryError::conflict(message)
        }
        _ => RepositoryError::Database(err),
    }
}

/// A stored value no longer satisfies its domain invariant
pub(crate) fn corrupt(what: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Storage(format!("Invalid {} from database: {}", what, err))
}
