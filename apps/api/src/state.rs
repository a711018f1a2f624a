//! Shared state handed to every request handler.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::domain::repositories::{
    CatalogRepository, FormRepository, InvitationRepository, LeagueRepository, PlayerRepository,
    RegistrationRepository, TeamRepository, UserRepository,
};
use crate::infrastructure::payments::PaymentGateway;
use crate::infrastructure::repositories::{
    InMemoryStore, PostgresCatalogRepository, PostgresFormRepository, PostgresInvitationRepository,
    PostgresLeagueRepository, PostgresPlayerRepository, PostgresRegistrationRepository,
    PostgresTeamRepository, PostgresUserRepository,
};

/// Repositories and the payment gateway behind trait objects
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub leagues: Arc<dyn LeagueRepository>,
    pub teams: Arc<dyn TeamRepository>,
    pub players: Arc<dyn PlayerRepository>,
    pub invitations: Arc<dyn InvitationRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub forms: Arc<dyn FormRepository>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(config: AppConfig, pool: PgPool, payments: Arc<dyn PaymentGateway>) -> Self {
        Self {
            config: Arc::new(config),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            leagues: Arc::new(PostgresLeagueRepository::new(pool.clone())),
            teams: Arc::new(PostgresTeamRepository::new(pool.clone())),
            players: Arc::new(PostgresPlayerRepository::new(pool.clone())),
            invitations: Arc::new(PostgresInvitationRepository::new(pool.clone())),
            registrations: Arc::new(PostgresRegistrationRepository::new(pool.clone())),
            catalog: Arc::new(PostgresCatalogRepository::new(pool.clone())),
            forms: Arc::new(PostgresFormRepository::new(pool)),
            payments,
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(config: AppConfig, payments: Arc<dyn PaymentGateway>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            config: Arc::new(config),
            users: store.clone(),
            leagues: store.clone(),
            teams: store.clone(),
            players: store.clone(),
            invitations: store.clone(),
            registrations: store.clone(),
            catalog: store.clone(),
            forms: store,
            payments,
        }
    }
}
