use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::unique_violation;
use crate::domain::league::{Division, League, LeaguePricing, LeagueSchedule, Sport};
use crate::domain::repositories::{LeagueRepository, RepositoryResult};

/// PostgreSQL implementation of LeagueRepository
pub struct PostgresLeagueRepository {
    pool: PgPool,
}

impl PostgresLeagueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn division_ids(&self, league_ids: &[Uuid]) -> RepositoryResult<HashMap<Uuid, Vec<Uuid>>> {
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT league_id, division_id
            FROM league_divisions
            WHERE league_id = ANY($1)
            ORDER BY division_id
            "#,
        )
        .bind(league_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (league_id, division_id) in rows {
            grouped.entry(league_id).or_default().push(division_id);
        }
        Ok(grouped)
    }
}

#[derive(sqlx::FromRow)]
struct SportRow {
    id: Uuid,
    name: String,
    description: String,
}

impl From<SportRow> for Sport {
    fn from(r: SportRow) -> Self {
        Sport {
            id: r.id,
            name: r.name,
            description: r.description,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DivisionRow {
    id: Uuid,
    sport_id: Uuid,
    name: String,
    skill_level: String,
    age_group: String,
}

impl From<DivisionRow> for Division {
    fn from(r: DivisionRow) -> Self {
        Division {
            id: r.id,
            sport_id: r.sport_id,
            name: r.name,
            skill_level: r.skill_level,
            age_group: r.age_group,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LeagueRow {
    id: Uuid,
    sport_id: Uuid,
    name: String,
    description: String,
    stripe_product_id: Option<String>,
    registration_start_date: NaiveDate,
    registration_end_date: NaiveDate,
    early_registration_deadline: NaiveDate,
    league_start_date: NaiveDate,
    league_end_date: NaiveDate,
    regular_registration_price: Decimal,
    early_registration_price: Decimal,
    max_teams: Option<i32>,
}

impl LeagueRow {
    fn into_league(self, division_ids: Vec<Uuid>) -> League {
        League::from_persistence(
            self.id,
            self.sport_id,
            self.name,
            self.description,
            self.stripe_product_id,
            LeagueSchedule {
                registration_start_date: self.registration_start_date,
                registration_end_date: self.registration_end_date,
                early_registration_deadline: self.early_registration_deadline,
                league_start_date: self.league_start_date,
                league_end_date: self.league_end_date,
            },
            LeaguePricing {
                regular_registration_price: self.regular_registration_price,
                early_registration_price: self.early_registration_price,
            },
            self.max_teams,
            division_ids,
        )
    }
}

const SELECT_LEAGUE: &str = r#"
    SELECT id, sport_id, name, description, stripe_product_id,
           registration_start_date, registration_end_date, early_registration_deadline,
           league_start_date, league_end_date,
           regular_registration_price, early_registration_price, max_teams
    FROM leagues
"#;

#[async_trait]
impl LeagueRepository for PostgresLeagueRepository {
    async fn create_sport(&self, sport: &Sport) -> RepositoryResult<()> {
        sqlx::query("INSERT INTO sports (id, name, description) VALUES ($1, $2, $3)")
            .bind(sport.id)
            .bind(&sport.name)
            .bind(&sport.description)
            .execute(&self.pool)
            .await
            .map_err(unique_violation("A sport with this name already exists"))?;
        Ok(())
    }

    async fn find_sport(&self, id: Uuid) -> RepositoryResult<Option<Sport>> {
        let row = sqlx::query_as::<_, SportRow>("SELECT id, name, description FROM sports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Sport::from))
    }

    async fn list_sports(&self) -> RepositoryResult<Vec<Sport>> {
        let rows = sqlx::query_as::<_, SportRow>("SELECT id, name, description FROM sports ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Sport::from).collect())
    }

    async fn create_division(&self, division: &Division) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO divisions (id, sport_id, name, skill_level, age_group)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(division.id)
        .bind(division.sport_id)
        .bind(&division.name)
        .bind(&division.skill_level)
        .bind(&division.age_group)
        .execute(&self.pool)
        .await
        .map_err(unique_violation("A division with this name already exists for the sport"))?;
        Ok(())
    }

    async fn find_division(&self, id: Uuid) -> RepositoryResult<Option<Division>> {
        let row = sqlx::query_as::<_, DivisionRow>(
            "SELECT id, sport_id, name, skill_level, age_group FROM divisions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Division::from))
    }

    async fn save_league(&self, league: &League) -> RepositoryResult<()> {
        let schedule = league.schedule();
        let pricing = league.pricing();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO leagues (
                id, sport_id, name, description, stripe_product_id,
                registration_start_date, registration_end_date, early_registration_deadline,
                league_start_date, league_end_date,
                regular_registration_price, early_registration_price, max_teams
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                stripe_product_id = EXCLUDED.stripe_product_id,
                registration_start_date = EXCLUDED.registration_start_date,
                registration_end_date = EXCLUDED.registration_end_date,
                early_registration_deadline = EXCLUDED.early_registration_deadline,
                league_start_date = EXCLUDED.league_start_date,
                league_end_date = EXCLUDED.league_end_date,
                regular_registration_price = EXCLUDED.regular_registration_price,
                early_registration_price = EXCLUDED.early_registration_price,
                max_teams = EXCLUDED.max_teams
            "#,
        )
        .bind(league.id())
        .bind(league.sport_id())
        .bind(league.name())
        .bind(league.description())
        .bind(league.stripe_product_id())
        .bind(schedule.registration_start_date)
        .bind(schedule.registration_end_date)
        .bind(schedule.early_registration_deadline)
        .bind(schedule.league_start_date)
        .bind(schedule.league_end_date)
        .bind(pricing.regular_registration_price)
        .bind(pricing.early_registration_price)
        .bind(league.max_teams())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM league_divisions WHERE league_id = $1")
            .bind(league.id())
            .execute(&mut *tx)
            .await?;

        for division_id in league.division_ids() {
            sqlx::query("INSERT INTO league_divisions (league_id, division_id) VALUES ($1, $2)")
                .bind(league.id())
                .bind(*division_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_league(&self, id: Uuid) -> RepositoryResult<Option<League>> {
        let Some(row) = sqlx::query_as::<_, LeagueRow>(&format!("{} WHERE id = $1", SELECT_LEAGUE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let mut divisions = self.division_ids(&[id]).await?;
        Ok(Some(row.into_league(divisions.remove(&id).unwrap_or_default())))
    }

    async fn list_leagues(&self) -> RepositoryResult<Vec<League>> {
        let rows = sqlx::query_as::<_, LeagueRow>(&format!(
            "{} ORDER BY registration_start_date DESC, name",
            SELECT_LEAGUE
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut divisions = self.division_ids(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let ids = divisions.remove(&row.id).unwrap_or_default();
                row.into_league(ids)
            })
            .collect())
    }

    async fn league_divisions(&self, league_id: Uuid) -> RepositoryResult<Vec<Division>> {
        let rows = sqlx::query_as::<_, DivisionRow>(
            r#"
            SELECT d.id, d.sport_id, d.name, d.skill_level, d.age_group
            FROM divisions d
            JOIN league_divisions ld ON ld.division_id = d.id
            WHERE ld.league_id = $1
            ORDER BY d.name
            "#,
        )
        .bind(league_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Division::from).collect())
    }
}
