use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::invitation::{InvitationNotification, TeamInvitation};
use crate::domain::player::{FreeAgent, Player};

/// Repository trait for team invitations and their notifications
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Insert; the (team, free agent) pair is unique
    async fn create(&self, invitation: &TeamInvitation) -> RepositoryResult<()>;

    /// Persist status, message and timestamps
    async fn update(&self, invitation: &TeamInvitation) -> RepositoryResult<()>;

    /// Persist an acceptance as one unit: the accepted invitation, the
    /// joined free agent, the new player and the invitations it cancelled
    async fn record_acceptance(
        &self,
        accepted: &TeamInvitation,
        free_agent: &FreeAgent,
        player: &Player,
        cancelled: &[TeamInvitation],
    ) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<TeamInvitation>>;

    async fn find_for_pair(
        &self,
        team_id: Uuid,
        free_agent_id: Uuid,
    ) -> RepositoryResult<Option<TeamInvitation>>;

    /// Invitations sent by any of the teams, newest first
    async fn for_teams(&self, team_ids: &[Uuid]) -> RepositoryResult<Vec<TeamInvitation>>;

    /// Invitations addressed to any of the free agents, newest first
    async fn for_free_agents(&self, free_agent_ids: &[Uuid]) -> RepositoryResult<Vec<TeamInvitation>>;

    async fn create_notification(&self, notification: &InvitationNotification) -> RepositoryResult<()>;

    async fn find_notification(&self, id: Uuid) -> RepositoryResult<Option<InvitationNotification>>;

    /// Persist the read timestamp
    async fn update_notification(&self, notification: &InvitationNotification) -> RepositoryResult<()>;

    /// A user's notifications, newest first
    async fn notifications_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<InvitationNotification>>;
}
