use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::league::{Division, League, Sport};

/// Repository trait for sports, divisions and leagues
#[async_trait]
pub trait LeagueRepository: Send + Sync {
    async fn create_sport(&self, sport: &Sport) -> RepositoryResult<()>;

    async fn find_sport(&self, id: Uuid) -> RepositoryResult<Option<Sport>>;

    /// All sports ordered by name
    async fn list_sports(&self) -> RepositoryResult<Vec<Sport>>;

    async fn create_division(&self, division: &Division) -> RepositoryResult<()>;

    async fn find_division(&self, id: Uuid) -> RepositoryResult<Option<Division>>;

    /// Save a league (insert or update), replacing its available divisions
    async fn save_league(&self, league: &League) -> RepositoryResult<()>;

    async fn find_league(&self, id: Uuid) -> RepositoryResult<Option<League>>;

    /// All leagues ordered by registration start, newest first
    async fn list_leagues(&self) -> RepositoryResult<Vec<League>>;

    /// Divisions offered by a league, ordered by name
    async fn league_divisions(&self, league_id: Uuid) -> RepositoryResult<Vec<Division>>;
}
