// Repository ports
// Implemented by the Postgres adapters and the in-memory store

pub mod catalog_repository;
pub mod form_repository;
pub mod invitation_repository;
pub mod league_repository;
pub mod player_repository;
pub mod registration_repository;
pub mod team_repository;
pub mod user_repository;

pub use catalog_repository::CatalogRepository;
pub use form_repository::FormRepository;
pub use invitation_repository::InvitationRepository;
pub use league_repository::LeagueRepository;
pub use player_repository::PlayerRepository;
pub use registration_repository::RegistrationRepository;
pub use team_repository::{TeamFilter, TeamRepository};
pub use user_repository::UserRepository;

use thiserror::Error;

/// Failure reported by a repository implementation
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    /// A uniqueness constraint rejected the write
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
