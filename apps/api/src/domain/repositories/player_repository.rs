use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::player::{FreeAgent, Player};

/// Repository trait for players and free-agent profiles
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Save a player (insert or update)
    async fn save_player(&self, player: &Player) -> RepositoryResult<()>;

    async fn find_player(&self, id: Uuid) -> RepositoryResult<Option<Player>>;

    /// Active players on a team, ordered by last then first name
    async fn team_players(&self, team_id: Uuid) -> RepositoryResult<Vec<Player>>;

    /// Create a profile; a second one for the same user and league is a `Conflict`
    async fn create_free_agent(&self, free_agent: &FreeAgent) -> RepositoryResult<()>;

    /// Persist a status change
    async fn update_free_agent(&self, free_agent: &FreeAgent) -> RepositoryResult<()>;

    async fn find_free_agent(&self, id: Uuid) -> RepositoryResult<Option<FreeAgent>>;

    /// AVAILABLE free agents of a league, newest first
    async fn available_free_agents(
        &self,
        league_id: Uuid,
        division_id: Option<Uuid>,
    ) -> RepositoryResult<Vec<FreeAgent>>;

    /// A user's profiles across leagues, newest first
    async fn free_agents_of_user(&self, user_id: Uuid) -> RepositoryResult<Vec<FreeAgent>>;
}
