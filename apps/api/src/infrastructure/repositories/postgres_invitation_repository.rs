use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::postgres_player_repository::{update_free_agent_status, upsert_player};
use super::unique_violation;
use crate::domain::invitation::{InvitationNotification, TeamInvitation};
use crate::domain::player::{FreeAgent, Player};
use crate::domain::repositories::{InvitationRepository, RepositoryError, RepositoryResult};

/// PostgreSQL implementation of InvitationRepository
pub struct PostgresInvitationRepository {
    pool: PgPool,
}

impl PostgresInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_INVITATION: &str = r#"
    SELECT id, team_id, free_agent_id, status, message, created_at, response_at
    FROM team_invitations
"#;

const SELECT_NOTIFICATION: &str = r#"
    SELECT id, user_id, invitation_id, created_at, read_at
    FROM invitation_notifications
"#;

async fn update_invitation<'e, E>(executor: E, invitation: &TeamInvitation) -> RepositoryResult<()>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE team_invitations
        SET status = $2, message = $3, created_at = $4, response_at = $5
        WHERE id = $1
        "#,
    )
    .bind(invitation.id)
    .bind(invitation.status)
    .bind(&invitation.message)
    .bind(invitation.created_at)
    .bind(invitation.response_at)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::not_found("Invitation"));
    }
    Ok(())
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn create(&self, invitation: &TeamInvitation) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO team_invitations (
                id, team_id, free_agent_id, status, message, created_at, response_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(invitation.id)
        .bind(invitation.team_id)
        .bind(invitation.free_agent_id)
        .bind(invitation.status)
        .bind(&invitation.message)
        .bind(invitation.created_at)
        .bind(invitation.response_at)
        .execute(&self.pool)
        .await
        .map_err(unique_violation("This team has already invited this free agent"))?;

        Ok(())
    }

    async fn update(&self, invitation: &TeamInvitation) -> RepositoryResult<()> {
        update_invitation(&self.pool, invitation).await
    }

    async fn record_acceptance(
        &self,
        accepted: &TeamInvitation,
        free_agent: &FreeAgent,
        player: &Player,
        cancelled: &[TeamInvitation],
    ) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;
        update_invitation(&mut *tx, accepted).await?;
        update_free_agent_status(&mut *tx, free_agent).await?;
        upsert_player(&mut *tx, player).await?;
        for invitation in cancelled {
            update_invitation(&mut *tx, invitation).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<TeamInvitation>> {
        let row = sqlx::query_as::<_, TeamInvitation>(&format!("{} WHERE id = $1", SELECT_INVITATION))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_for_pair(
        &self,
        team_id: Uuid,
        free_agent_id: Uuid,
    ) -> RepositoryResult<Option<TeamInvitation>> {
        let row = sqlx::query_as::<_, TeamInvitation>(&format!(
            "{} WHERE team_id = $1 AND free_agent_id = $2",
            SELECT_INVITATION
        ))
        .bind(team_id)
        .bind(free_agent_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn for_teams(&self, team_ids: &[Uuid]) -> RepositoryResult<Vec<TeamInvitation>> {
        let rows = sqlx::query_as::<_, TeamInvitation>(&format!(
            "{} WHERE team_id = ANY($1) ORDER BY created_at DESC",
            SELECT_INVITATION
        ))
        .bind(team_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn for_free_agents(&self, free_agent_ids: &[Uuid]) -> RepositoryResult<Vec<TeamInvitation>> {
        let rows = sqlx::query_as::<_, TeamInvitation>(&format!(
            "{} WHERE free_agent_id = ANY($1) ORDER BY created_at DESC",
            SELECT_INVITATION
        ))
        .bind(free_agent_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_notification(&self, notification: &InvitationNotification) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invitation_notifications (id, user_id, invitation_id, created_at, read_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.invitation_id)
        .bind(notification.created_at)
        .bind(notification.read_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_notification(&self, id: Uuid) -> RepositoryResult<Option<InvitationNotification>> {
        let row = sqlx::query_as::<_, InvitationNotification>(&format!(
            "{} WHERE id = $1",
            SELECT_NOTIFICATION
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_notification(&self, notification: &InvitationNotification) -> RepositoryResult<()> {
        sqlx::query("UPDATE invitation_notifications SET read_at = $2 WHERE id = $1")
            .bind(notification.id)
            .bind(notification.read_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn notifications_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<InvitationNotification>> {
        let rows = sqlx::query_as::<_, InvitationNotification>(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_NOTIFICATION
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
