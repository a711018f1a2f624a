use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::postgres_player_repository::upsert_player;
use super::unique_violation;
use crate::domain::player::Player;
use crate::domain::registration::{PaymentStatus, Registration, RegistrationFilter, RegistrationSummary};
use crate::domain::repositories::{RegistrationRepository, RepositoryError, RepositoryResult};

/// PostgreSQL implementation of RegistrationRepository
pub struct PostgresRegistrationRepository {
    pool: PgPool,
}

impl PostgresRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_REGISTRATION: &str = r#"
    SELECT id, player_id, league_id, division_id, registered_at, payment_status,
           stripe_payment_intent, stripe_checkout_session, notes, is_late_registration
    FROM registrations
"#;

async fn insert_registration<'e, E>(executor: E, registration: &Registration) -> RepositoryResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO registrations (
            id, player_id, league_id, division_id, registered_at, payment_status,
            stripe_payment_intent, stripe_checkout_session, notes, is_late_registration
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(registration.id)
    .bind(registration.player_id)
    .bind(registration.league_id)
    .bind(registration.division_id)
    .bind(registration.registered_at)
    .bind(registration.payment_status)
    .bind(&registration.stripe_payment_intent)
    .bind(&registration.stripe_checkout_session)
    .bind(&registration.notes)
    .bind(registration.is_late_registration)
    .execute(executor)
    .await
    .map_err(unique_violation("This player is already registered in this league"))?;

    Ok(())
}

#[async_trait]
impl RegistrationRepository for PostgresRegistrationRepository {
    async fn create(&self, registration: &Registration) -> RepositoryResult<()> {
        insert_registration(&self.pool, registration).await
    }

    async fn create_with_player(&self, player: &Player, registration: &Registration) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;
        upsert_player(&mut *tx, player).await?;
        insert_registration(&mut *tx, registration).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Registration>> {
        let row = sqlx::query_as::<_, Registration>(&format!("{} WHERE id = $1", SELECT_REGISTRATION))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_checkout_session(&self, session_id: &str) -> RepositoryResult<Option<Registration>> {
        let row = sqlx::query_as::<_, Registration>(&format!(
            "{} WHERE stripe_checkout_session = $1",
            SELECT_REGISTRATION
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_status(&self, id: Uuid, status: PaymentStatus) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE registrations SET payment_status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Registration"));
        }
        Ok(())
    }

    async fn summaries(&self, filter: &RegistrationFilter) -> RepositoryResult<Vec<RegistrationSummary>> {
        let rows = sqlx::query_as::<_, RegistrationSummary>(
            r#"
            SELECT r.id, r.player_id,
                   p.first_name AS player_first_name,
                   p.last_name AS player_last_name,
                   p.email AS player_email,
                   p.phone_number AS player_phone_number,
                   p.user_id AS player_user_id,
                   t.id AS team_id,
                   t.name AS team_name,
                   r.league_id, r.division_id,
                   d.name AS division_name,
                   r.payment_status, r.is_late_registration, r.registered_at
            FROM registrations r
            JOIN players p ON p.id = r.player_id
            JOIN divisions d ON d.id = r.division_id
            LEFT JOIN teams t ON t.id = p.team_id
            WHERE ($1::uuid IS NULL OR r.league_id = $1)
              AND ($2::uuid IS NULL OR r.division_id = $2)
              AND ($3::uuid IS NULL OR p.team_id = $3)
              AND ($4::text IS NULL
                   OR LOWER(p.first_name) LIKE '%' || $4 || '%'
                   OR LOWER(p.last_name) LIKE '%' || $4 || '%'
                   OR LOWER(p.email) LIKE '%' || $4 || '%'
                   OR LOWER(p.phone_number) LIKE '%' || $4 || '%')
            "#,
        )
        .bind(filter.league)
        .bind(filter.division)
        .bind(filter.team)
        .bind(filter.search_term())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
