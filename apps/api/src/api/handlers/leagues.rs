use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::teams::TeamResponse;
use super::AppJson;
use crate::api::errors::ApiError;
use crate::api::middleware::{AdminUser, CurrentUser};
use crate::domain::league::{Division, League, LeaguePricing, LeagueSchedule, Sport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSportRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateDivisionRequest {
    pub name: String,
    #[serde(default)]
    pub skill_level: String,
    #[serde(default)]
    pub age_group: String,
}

/// Request body for creating or updating a league
#[derive(Debug, Deserialize)]
pub struct LeagueRequest {
    pub sport_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub stripe_product_id: Option<String>,
    pub registration_start_date: NaiveDate,
    pub registration_end_date: NaiveDate,
    pub early_registration_deadline: NaiveDate,
    pub league_start_date: NaiveDate,
    pub league_end_date: NaiveDate,
    pub regular_registration_price: Decimal,
    pub early_registration_price: Decimal,
    pub max_teams: Option<i32>,
    #[serde(default)]
    pub division_ids: Vec<Uuid>,
}

impl LeagueRequest {
    fn schedule(&self) -> LeagueSchedule {
        LeagueSchedule {
            registration_start_date: self.registration_start_date,
            registration_end_date: self.registration_end_date,
            early_registration_deadline: self.early_registration_deadline,
            league_start_date: self.league_start_date,
            league_end_date: self.league_end_date,
        }
    }

    fn pricing(&self) -> LeaguePricing {
        LeaguePricing {
            regular_registration_price: self.regular_registration_price,
            early_registration_price: self.early_registration_price,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetDivisionsRequest {
    pub division_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct LeagueResponse {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub name: String,
    pub description: String,
    pub stripe_product_id: Option<String>,
    pub registration_start_date: NaiveDate,
    pub registration_end_date: NaiveDate,
    pub early_registration_deadline: NaiveDate,
    pub league_start_date: NaiveDate,
    pub league_end_date: NaiveDate,
    pub regular_registration_price: Decimal,
    pub early_registration_price: Decimal,
    pub max_teams: Option<i32>,
    pub division_ids: Vec<Uuid>,
    pub is_registration_open: bool,
    pub is_early_registration_active: bool,
    pub current_price: Decimal,
}

impl From<&League> for LeagueResponse {
    fn from(league: &League) -> Self {
        let today = Utc::now().date_naive();
        let schedule = league.schedule();
        let pricing = league.pricing();
        Self {
            id: league.id(),
            sport_id: league.sport_id(),
            name: league.name().to_string(),
            description: league.description().to_string(),
            stripe_product_id: league.stripe_product_id().map(str::to_string),
            registration_start_date: schedule.registration_start_date,
            registration_end_date: schedule.registration_end_date,
            early_registration_deadline: schedule.early_registration_deadline,
            league_start_date: schedule.league_start_date,
            league_end_date: schedule.league_end_date,
            regular_registration_price: pricing.regular_registration_price,
            early_registration_price: pricing.early_registration_price,
            max_teams: league.max_teams(),
            division_ids: league.division_ids().to_vec(),
            is_registration_open: league.is_registration_open(today),
            is_early_registration_active: league.is_early_registration_active(today),
            current_price: league.price_for(today),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SportLeagues {
    #[serde(flatten)]
    pub sport: Sport,
    pub leagues: Vec<LeagueResponse>,
}

#[derive(Debug, Serialize)]
pub struct DivisionTeams {
    #[serde(flatten)]
    pub division: Division,
    pub teams: Vec<TeamResponse>,
}

#[derive(Debug, Serialize)]
pub struct DivisionDetail {
    #[serde(flatten)]
    pub division: Division,
    pub team_count: usize,
    pub player_count: usize,
}

pub(crate) async fn load_league(state: &AppState, id: Uuid) -> Result<League, ApiError> {
    state
        .leagues
        .find_league(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("League not found: {}", id)))
}

async fn load_division(state: &AppState, id: Uuid) -> Result<Division, ApiError> {
    state
        .leagues
        .find_division(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Division not found: {}", id)))
}

/// Resolves every id, failing on the first unknown one
async fn load_divisions(state: &AppState, ids: &[Uuid]) -> Result<Vec<Division>, ApiError> {
    let mut divisions = Vec::with_capacity(ids.len());
    for id in ids {
        divisions.push(load_division(state, *id).await?);
    }
    Ok(divisions)
}

/// GET /api/sports
pub async fn list_sports(State(state): State<AppState>) -> Result<Json<Vec<Sport>>, ApiError> {
    Ok(Json(state.leagues.list_sports().await?))
}

/// POST /api/sports
pub async fn create_sport(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppJson(req): AppJson<CreateSportRequest>,
) -> Result<(StatusCode, Json<Sport>), ApiError> {
    let sport = Sport::new(&req.name, &req.description)?;
    state.leagues.create_sport(&sport).await?;
    Ok((StatusCode::CREATED, Json(sport)))
}

/// POST /api/sports/:id/divisions
pub async fn create_division(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(sport_id): Path<Uuid>,
    AppJson(req): AppJson<CreateDivisionRequest>,
) -> Result<(StatusCode, Json<Division>), ApiError> {
    state
        .leagues
        .find_sport(sport_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Sport not found: {}", sport_id)))?;

    let division = Division::new(sport_id, &req.name, &req.skill_level, &req.age_group)?;
    state.leagues.create_division(&division).await?;
    Ok((StatusCode::CREATED, Json(division)))
}

/// Sports with the leagues currently open for registration
///
/// GET /api/leagues
pub async fn open_leagues(State(state): State<AppState>) -> Result<Json<Vec<SportLeagues>>, ApiError> {
    let today = Utc::now().date_naive();
    let leagues = state.leagues.list_leagues().await?;

    let grouped = state
        .leagues
        .list_sports()
        .await?
        .into_iter()
        .map(|sport| {
            let leagues = leagues
                .iter()
                .filter(|l| l.sport_id() == sport.id && l.is_registration_open(today))
                .map(LeagueResponse::from)
                .collect();
            SportLeagues { sport, leagues }
        })
        .collect();

    Ok(Json(grouped))
}

/// POST /api/leagues
pub async fn create_league(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppJson(req): AppJson<LeagueRequest>,
) -> Result<(StatusCode, Json<LeagueResponse>), ApiError> {
    state
        .leagues
        .find_sport(req.sport_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Sport not found: {}", req.sport_id)))?;

    let mut league = League::new(
        req.sport_id,
        &req.name,
        &req.description,
        req.schedule(),
        req.pricing(),
        req.max_teams,
        req.stripe_product_id.clone(),
    )?;
    league.set_divisions(&load_divisions(&state, &req.division_ids).await?)?;

    state.leagues.save_league(&league).await?;
    tracing::info!(league_id = %league.id(), name = %league.name(), "league created");

    Ok((StatusCode::CREATED, Json(LeagueResponse::from(&league))))
}

/// GET /api/leagues/:id
pub async fn get_league(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeagueResponse>, ApiError> {
    let league = load_league(&state, id).await?;
    Ok(Json(LeagueResponse::from(&league)))
}

/// Updates details; divisions are replaced only when ids are given
///
/// PUT /api/leagues/:id
pub async fn update_league(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<LeagueRequest>,
) -> Result<Json<LeagueResponse>, ApiError> {
    let mut league = load_league(&state, id).await?;
    if req.sport_id != league.sport_id() {
        return Err(ApiError::bad_request("A league cannot change sport"));
    }

    league.update(
        &req.name,
        &req.description,
        req.schedule(),
        req.pricing(),
        req.max_teams,
        req.stripe_product_id.clone(),
    )?;
    if !req.division_ids.is_empty() {
        league.set_divisions(&load_divisions(&state, &req.division_ids).await?)?;
    }

    state.leagues.save_league(&league).await?;
    Ok(Json(LeagueResponse::from(&league)))
}

/// PUT /api/leagues/:id/divisions
pub async fn set_league_divisions(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<SetDivisionsRequest>,
) -> Result<Json<LeagueResponse>, ApiError> {
    let mut league = load_league(&state, id).await?;
    league.set_divisions(&load_divisions(&state, &req.division_ids).await?)?;
    state.leagues.save_league(&league).await?;
    Ok(Json(LeagueResponse::from(&league)))
}

/// GET /api/leagues/:id/divisions
pub async fn league_divisions(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Division>>, ApiError> {
    load_league(&state, id).await?;
    Ok(Json(state.leagues.league_divisions(id).await?))
}

/// GET /api/leagues/:id/divisions-teams
pub async fn league_divisions_teams(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DivisionTeams>>, ApiError> {
    load_league(&state, id).await?;

    let mut result = Vec::new();
    for division in state.leagues.league_divisions(id).await? {
        let teams = state
            .teams
            .find_by_division(division.id)
            .await?
            .iter()
            .filter(|t| t.league_id() == id)
            .map(TeamResponse::from)
            .collect();
        result.push(DivisionTeams { division, teams });
    }
    Ok(Json(result))
}

/// GET /api/divisions/:id
pub async fn get_division(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DivisionDetail>, ApiError> {
    let division = load_division(&state, id).await?;
    let teams = state.teams.find_by_division(id).await?;

    let mut player_count = 0;
    for team in &teams {
        player_count += state.players.team_players(team.id()).await?.len();
    }

    Ok(Json(DivisionDetail {
        division,
        team_count: teams.len(),
        player_count,
    }))
}

/// GET /api/divisions/:id/teams
pub async fn division_teams(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TeamResponse>>, ApiError> {
    load_division(&state, id).await?;
    let teams = state.teams.find_by_division(id).await?;
    Ok(Json(teams.iter().map(TeamResponse::from).collect()))
}
