use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{corrupt, unique_violation};
use crate::domain::repositories::{RepositoryError, RepositoryResult, TeamFilter, TeamRepository};
use crate::domain::team::{SignupCode, Team, TeamCaptain};
use crate::domain::user::Email;

/// PostgreSQL implementation of TeamRepository
///
/// Persists Team aggregates together with the captains they point at.
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Creates a new PostgresTeamRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_teams(&self, sql: &str, id: Uuid) -> RepositoryResult<Vec<Team>> {
        sqlx::query_as::<_, TeamRow>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Team::try_from)
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    league_id: Uuid,
    division_id: Uuid,
    captain_id: Uuid,
    signup_code: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TeamRow> for Team {
    type Error = RepositoryError;

    fn try_from(r: TeamRow) -> Result<Self, Self::Error> {
        let code = SignupCode::parse(&r.signup_code).map_err(|e| corrupt("signup code", e))?;
        Ok(Team::from_persistence(
            r.id,
            r.name,
            r.league_id,
            r.division_id,
            r.captain_id,
            code,
            r.created_at,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct CaptainRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    user_id: Option<Uuid>,
    is_system_captain: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<CaptainRow> for TeamCaptain {
    type Error = RepositoryError;

    fn try_from(r: CaptainRow) -> Result<Self, Self::Error> {
        Ok(TeamCaptain {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            email: Email::new(r.email).map_err(|e| corrupt("captain email", e))?,
            phone_number: r.phone_number,
            user_id: r.user_id,
            is_system_captain: r.is_system_captain,
            created_at: r.created_at,
        })
    }
}

const TEAM_COLUMNS: &str =
    "t.id, t.name, t.league_id, t.division_id, t.captain_id, t.signup_code, t.created_at";

const CAPTAIN_COLUMNS: &str =
    "id, first_name, last_name, email, phone_number, user_id, is_system_captain, created_at";

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn save(&self, team: &Team) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO teams (id, name, league_id, division_id, captain_id, signup_code, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                league_id = EXCLUDED.league_id,
                division_id = EXCLUDED.division_id,
                captain_id = EXCLUDED.captain_id
            "#,
        )
        .bind(team.id())
        .bind(team.name())
        .bind(team.league_id())
        .bind(team.division_id())
        .bind(team.captain_id())
        .bind(team.signup_code().as_str())
        .bind(team.created_at())
        .execute(&self.pool)
        .await
        .map_err(unique_violation("Signup code already in use"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>> {
        sqlx::query_as::<_, TeamRow>(&format!("SELECT {} FROM teams t WHERE t.id = $1", TEAM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Team::try_from)
            .transpose()
    }

    async fn find_by_signup_code(&self, code: &SignupCode) -> RepositoryResult<Option<Team>> {
        sqlx::query_as::<_, TeamRow>(&format!(
            "SELECT {} FROM teams t WHERE t.signup_code = $1",
            TEAM_COLUMNS
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Team::try_from)
        .transpose()
    }

    async fn signup_code_exists(&self, code: &SignupCode) -> RepositoryResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE signup_code = $1)")
                .bind(code.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn list(&self, filter: &TeamFilter) -> RepositoryResult<Vec<Team>> {
        sqlx::query_as::<_, TeamRow>(&format!(
            r#"
            SELECT {}
            FROM teams t
            JOIN leagues l ON l.id = t.league_id
            JOIN divisions d ON d.id = t.division_id
            WHERE ($1::uuid IS NULL OR t.league_id = $1)
              AND ($2::uuid IS NULL OR t.division_id = $2)
              AND ($3::text IS NULL OR LOWER(t.name) LIKE '%' || $3 || '%')
            ORDER BY l.name, d.name, t.name
            "#,
            TEAM_COLUMNS
        ))
        .bind(filter.league)
        .bind(filter.division)
        .bind(filter.search_term())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Team::try_from)
        .collect()
    }

    async fn find_by_division(&self, division_id: Uuid) -> RepositoryResult<Vec<Team>> {
        let sql = format!(
            "SELECT {} FROM teams t WHERE t.division_id = $1 ORDER BY t.name",
            TEAM_COLUMNS
        );
        self.fetch_teams(&sql, division_id).await
    }

    async fn find_by_captain_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Team>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM teams t
            JOIN team_captains c ON c.id = t.captain_id
            WHERE c.user_id = $1
            ORDER BY t.name
            "#,
            TEAM_COLUMNS
        );
        self.fetch_teams(&sql, user_id).await
    }

    async fn find_claimable(&self, email: &Email) -> RepositoryResult<Vec<Team>> {
        sqlx::query_as::<_, TeamRow>(&format!(
            r#"
            SELECT {}
            FROM teams t
            JOIN team_captains c ON c.id = t.captain_id
            WHERE c.user_id IS NULL AND NOT c.is_system_captain AND c.email = $1
            ORDER BY t.name
            "#,
            TEAM_COLUMNS
        ))
        .bind(email.as_str())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Team::try_from)
        .collect()
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Team"));
        }

        Ok(())
    }

    async fn save_captain(&self, captain: &TeamCaptain) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO team_captains (
                id, first_name, last_name, email, phone_number,
                user_id, is_system_captain, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                phone_number = EXCLUDED.phone_number,
                user_id = EXCLUDED.user_id
            "#,
        )
        .bind(captain.id)
        .bind(&captain.first_name)
        .bind(&captain.last_name)
        .bind(captain.email.as_str())
        .bind(&captain.phone_number)
        .bind(captain.user_id)
        .bind(captain.is_system_captain)
        .bind(captain.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_captain(&self, id: Uuid) -> RepositoryResult<Option<TeamCaptain>> {
        sqlx::query_as::<_, CaptainRow>(&format!(
            "SELECT {} FROM team_captains WHERE id = $1",
            CAPTAIN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(TeamCaptain::try_from)
        .transpose()
    }

    async fn find_captain_by_email(&self, email: &Email) -> RepositoryResult<Option<TeamCaptain>> {
        sqlx::query_as::<_, CaptainRow>(&format!(
            r#"
            SELECT {}
            FROM team_captains
            WHERE email = $1 AND NOT is_system_captain
            ORDER BY created_at
            LIMIT 1
            "#,
            CAPTAIN_COLUMNS
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(TeamCaptain::try_from)
        .transpose()
    }

    async fn find_system_captain(&self) -> RepositoryResult<Option<TeamCaptain>> {
        sqlx::query_as::<_, CaptainRow>(&format!(
            "SELECT {} FROM team_captains WHERE is_system_captain ORDER BY created_at LIMIT 1",
            CAPTAIN_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?
        .map(TeamCaptain::try_from)
        .transpose()
    }

    async fn is_captain(&self, user_id: Uuid, email: &Email) -> RepositoryResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM team_captains
                WHERE user_id = $1
                   OR (user_id IS NULL AND NOT is_system_captain AND email = $2)
            )
            "#,
        )
        .bind(user_id)
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
