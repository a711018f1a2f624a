use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::{corrupt, unique_violation};
use crate::domain::player::{FreeAgent, FreeAgentStatus, PersonalDetails, Player};
use crate::domain::repositories::{PlayerRepository, RepositoryError, RepositoryResult};
use crate::domain::user::Email;

/// PostgreSQL implementation of PlayerRepository
pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Columns shared by `players` and `free_agents`
#[derive(sqlx::FromRow)]
struct DetailsColumns {
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    date_of_birth: NaiveDate,
    parent_name: Option<String>,
    membership_number: Option<String>,
    is_member: bool,
}

impl TryFrom<DetailsColumns> for PersonalDetails {
    type Error = RepositoryError;

    fn try_from(c: DetailsColumns) -> Result<Self, Self::Error> {
        Ok(PersonalDetails {
            first_name: c.first_name,
            last_name: c.last_name,
            email: Email::new(c.email).map_err(|e| corrupt("player email", e))?,
            phone_number: c.phone_number,
            date_of_birth: c.date_of_birth,
            parent_name: c.parent_name,
            membership_number: c.membership_number,
            is_member: c.is_member,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PlayerRow {
    id: Uuid,
    #[sqlx(flatten)]
    details: DetailsColumns,
    user_id: Option<Uuid>,
    team_id: Option<Uuid>,
    is_active: bool,
}

impl TryFrom<PlayerRow> for Player {
    type Error = RepositoryError;

    fn try_from(r: PlayerRow) -> Result<Self, Self::Error> {
        Ok(Player {
            id: r.id,
            details: r.details.try_into()?,
            user_id: r.user_id,
            team_id: r.team_id,
            is_active: r.is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FreeAgentRow {
    id: Uuid,
    user_id: Uuid,
    league_id: Uuid,
    division_id: Uuid,
    #[sqlx(flatten)]
    details: DetailsColumns,
    notes: String,
    status: FreeAgentStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<FreeAgentRow> for FreeAgent {
    type Error = RepositoryError;

    fn try_from(r: FreeAgentRow) -> Result<Self, Self::Error> {
        Ok(FreeAgent {
            id: r.id,
            user_id: r.user_id,
            league_id: r.league_id,
            division_id: r.division_id,
            details: r.details.try_into()?,
            notes: r.notes,
            status: r.status,
            created_at: r.created_at,
        })
    }
}

const DETAIL_COLUMNS: &str = "first_name, last_name, email, phone_number, date_of_birth, \
                              parent_name, membership_number, is_member";

fn collect<R, T>(rows: Vec<R>) -> RepositoryResult<Vec<T>>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Insert or update a player on any executor, pool or open transaction
pub(super) async fn upsert_player<'e, E>(executor: E, player: &Player) -> RepositoryResult<()>
where
    E: PgExecutor<'e>,
{
    let d = &player.details;
    sqlx::query(
        r#"
        INSERT INTO players (
            id, first_name, last_name, email, phone_number, date_of_birth,
            parent_name, membership_number, is_member, user_id, team_id, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (id) DO UPDATE SET
            first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            email = EXCLUDED.email,
            phone_number = EXCLUDED.phone_number,
            date_of_birth = EXCLUDED.date_of_birth,
            parent_name = EXCLUDED.parent_name,
            membership_number = EXCLUDED.membership_number,
            is_member = EXCLUDED.is_member,
            user_id = EXCLUDED.user_id,
            team_id = EXCLUDED.team_id,
            is_active = EXCLUDED.is_active
        "#,
    )
    .bind(player.id)
    .bind(&d.first_name)
    .bind(&d.last_name)
    .bind(d.email.as_str())
    .bind(&d.phone_number)
    .bind(d.date_of_birth)
    .bind(&d.parent_name)
    .bind(&d.membership_number)
    .bind(d.is_member)
    .bind(player.user_id)
    .bind(player.team_id)
    .bind(player.is_active)
    .execute(executor)
    .await?;

    Ok(())
}

pub(super) async fn update_free_agent_status<'e, E>(executor: E, free_agent: &FreeAgent) -> RepositoryResult<()>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("UPDATE free_agents SET status = $2, notes = $3 WHERE id = $1")
        .bind(free_agent.id)
        .bind(free_agent.status)
        .bind(&free_agent.notes)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::not_found("Free agent"));
    }
    Ok(())
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    async fn save_player(&self, player: &Player) -> RepositoryResult<()> {
        upsert_player(&self.pool, player).await
    }

    async fn find_player(&self, id: Uuid) -> RepositoryResult<Option<Player>> {
        sqlx::query_as::<_, PlayerRow>(&format!(
            "SELECT id, {}, user_id, team_id, is_active FROM players WHERE id = $1",
            DETAIL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Player::try_from)
        .transpose()
    }

    async fn team_players(&self, team_id: Uuid) -> RepositoryResult<Vec<Player>> {
        let rows = sqlx::query_as::<_, PlayerRow>(&format!(
            r#"
            SELECT id, {}, user_id, team_id, is_active
            FROM players
            WHERE team_id = $1 AND is_active
            ORDER BY last_name, first_name
            "#,
            DETAIL_COLUMNS
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn create_free_agent(&self, free_agent: &FreeAgent) -> RepositoryResult<()> {
        let d = &free_agent.details;
        sqlx::query(
            r#"
            INSERT INTO free_agents (
                id, user_id, league_id, division_id,
                first_name, last_name, email, phone_number, date_of_birth,
                parent_name, membership_number, is_member, notes, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(free_agent.id)
        .bind(free_agent.user_id)
        .bind(free_agent.league_id)
        .bind(free_agent.division_id)
        .bind(&d.first_name)
        .bind(&d.last_name)
        .bind(d.email.as_str())
        .bind(&d.phone_number)
        .bind(d.date_of_birth)
        .bind(&d.parent_name)
        .bind(&d.membership_number)
        .bind(d.is_member)
        .bind(&free_agent.notes)
        .bind(free_agent.status)
        .bind(free_agent.created_at)
        .execute(&self.pool)
        .await
        .map_err(unique_violation(
            "You are already registered as a free agent in this league",
        ))?;

        Ok(())
    }

    async fn update_free_agent(&self, free_agent: &FreeAgent) -> RepositoryResult<()> {
        update_free_agent_status(&self.pool, free_agent).await
    }

    async fn find_free_agent(&self, id: Uuid) -> RepositoryResult<Option<FreeAgent>> {
        sqlx::query_as::<_, FreeAgentRow>(&format!(
            r#"
            SELECT id, user_id, league_id, division_id, {}, notes, status, created_at
            FROM free_agents
            WHERE id = $1
            "#,
            DETAIL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(FreeAgent::try_from)
        .transpose()
    }

    async fn available_free_agents(
        &self,
        league_id: Uuid,
        division_id: Option<Uuid>,
    ) -> RepositoryResult<Vec<FreeAgent>> {
        let rows = sqlx::query_as::<_, FreeAgentRow>(&format!(
            r#"
            SELECT id, user_id, league_id, division_id, {}, notes, status, created_at
            FROM free_agents
            WHERE league_id = $1
              AND status = 'AVAILABLE'
              AND ($2::uuid IS NULL OR division_id = $2)
            ORDER BY created_at DESC
            "#,
            DETAIL_COLUMNS
        ))
        .bind(league_id)
        .bind(division_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn free_agents_of_user(&self, user_id: Uuid) -> RepositoryResult<Vec<FreeAgent>> {
        let rows = sqlx::query_as::<_, FreeAgentRow>(&format!(
            r#"
            SELECT id, user_id, league_id, division_id, {}, notes, status, created_at
            FROM free_agents
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
            DETAIL_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }
}
