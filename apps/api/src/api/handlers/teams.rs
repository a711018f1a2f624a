use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::leagues::{load_league, LeagueResponse};
use super::{AppJson, AppQuery};
use crate::api::errors::ApiError;
use crate::api::middleware::{AdminUser, CurrentUser};
use crate::domain::invitation::TeamInvitation;
use crate::domain::player::{PersonalDetails, Player};
use crate::domain::repositories::TeamFilter;
use crate::domain::team::{SignupCode, Team, TeamCaptain};
use crate::services::invitations;
use crate::services::teams::{self, CaptainInput};
use crate::state::AppState;

/// Request body for creating a team
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub league_id: Uuid,
    pub division_id: Uuid,
    pub captain: Option<CaptainInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: String,
    pub league_id: Uuid,
    pub division_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AssignPlayerRequest {
    pub player_id: Uuid,
}

/// Team as returned by every team endpoint
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub league_id: Uuid,
    pub division_id: Uuid,
    pub captain_id: Uuid,
    pub signup_code: String,
    pub signup_path: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id(),
            name: team.name().to_string(),
            league_id: team.league_id(),
            division_id: team.division_id(),
            captain_id: team.captain_id(),
            signup_code: team.signup_code().to_string(),
            signup_path: team.signup_path(),
            created_at: team.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamWithCaptain {
    #[serde(flatten)]
    pub team: TeamResponse,
    pub captain: TeamCaptain,
}

#[derive(Debug, Serialize)]
pub struct DashboardTeam {
    #[serde(flatten)]
    pub team: TeamResponse,
    /// Captain record is unlinked and carries the caller's email
    pub claimable: bool,
}

#[derive(Debug, Serialize)]
pub struct TeamDetail {
    pub team: TeamResponse,
    pub captain: TeamCaptain,
    pub league: LeagueResponse,
    pub players: Vec<Player>,
    pub pending_invitations: Vec<TeamInvitation>,
}

#[derive(Debug, Serialize)]
pub struct SignupTeamResponse {
    pub team_id: Uuid,
    pub team_name: String,
    pub league: LeagueResponse,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub team_id: Uuid,
    pub player: Player,
    pub message: String,
}

/// Admin team listing, filtered and ordered by league, division and name
///
/// GET /api/teams/manage
pub async fn manage_teams(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppQuery(filter): AppQuery<TeamFilter>,
) -> Result<Json<Vec<TeamResponse>>, ApiError> {
    let teams = state.teams.list(&filter).await?;
    Ok(Json(teams.iter().map(TeamResponse::from).collect()))
}

/// Create a new team
///
/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppJson(req): AppJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamWithCaptain>), ApiError> {
    let (team, captain) =
        teams::create_team(&state, &req.name, req.league_id, req.division_id, req.captain).await?;

    Ok((
        StatusCode::CREATED,
        Json(TeamWithCaptain {
            team: TeamResponse::from(&team),
            captain,
        }),
    ))
}

/// Teams the caller captains or may claim
///
/// GET /api/teams/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<DashboardTeam>>, ApiError> {
    let mut result = Vec::new();
    for team in teams::captained_teams(&state, &user).await? {
        let captain = teams::team_captain(&state, &team).await?;
        result.push(DashboardTeam {
            team: TeamResponse::from(&team),
            claimable: captain.is_claimable_by(&user),
        });
    }
    Ok(Json(result))
}

/// Team detail for its captain
///
/// GET /api/teams/:id
pub async fn get_team(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamDetail>, ApiError> {
    let (team, captain) = teams::require_captain(&state, &user, id).await?;
    let league = load_league(&state, team.league_id()).await?;
    let players = state.players.team_players(id).await?;
    let pending_invitations = invitations::team_pending(&state, &user, id).await?;

    Ok(Json(TeamDetail {
        team: TeamResponse::from(&team),
        captain,
        league: LeagueResponse::from(&league),
        players,
        pending_invitations,
    }))
}

/// PUT /api/teams/:id
pub async fn update_team(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let mut team = teams::find_team(&state, id).await?;
    let league = load_league(&state, req.league_id).await?;
    let division = state
        .leagues
        .find_division(req.division_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Division not found: {}", req.division_id)))?;

    team.edit(&req.name, &league, &division)?;
    state.teams.save(&team).await?;
    Ok(Json(TeamResponse::from(&team)))
}

/// Delete a team
///
/// DELETE /api/teams/:id
pub async fn delete_team(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    teams::delete_team(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/teams/:id/claim
pub async fn claim_team(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamWithCaptain>, ApiError> {
    let (team, captain) = teams::claim_team(&state, &user, id).await?;
    Ok(Json(TeamWithCaptain {
        team: TeamResponse::from(&team),
        captain,
    }))
}

/// GET /api/teams/:id/players
pub async fn team_players(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Player>>, ApiError> {
    teams::find_team(&state, id).await?;
    Ok(Json(state.players.team_players(id).await?))
}

/// GET /api/teams/:id/pending-invitations
pub async fn pending_invitations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TeamInvitation>>, ApiError> {
    Ok(Json(invitations::team_pending(&state, &user, id).await?))
}

/// POST /api/teams/:id/assign-player
pub async fn assign_player(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<AssignPlayerRequest>,
) -> Result<Json<Player>, ApiError> {
    Ok(Json(teams::assign_player(&state, id, req.player_id).await?))
}

/// POST /api/teams/:id/remove-player/:player_id
pub async fn remove_player(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Player>, ApiError> {
    Ok(Json(teams::remove_player(&state, &user, id, player_id).await?))
}

/// Public lookup behind a signup link
///
/// GET /api/teams/signup/:code
pub async fn signup_team(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SignupTeamResponse>, ApiError> {
    let code = SignupCode::parse(&code)
        .map_err(|_| ApiError::not_found("Invalid signup code"))?;
    let team = state
        .teams
        .find_by_signup_code(&code)
        .await?
        .ok_or_else(|| ApiError::not_found("Invalid signup code"))?;
    let league = load_league(&state, team.league_id()).await?;

    Ok(Json(SignupTeamResponse {
        team_id: team.id(),
        team_name: team.name().to_string(),
        league: LeagueResponse::from(&league),
    }))
}

/// POST /api/teams/signup/:code
pub async fn signup_player(
    State(state): State<AppState>,
    Path(code): Path<String>,
    AppJson(details): AppJson<PersonalDetails>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let (team, player) = teams::signup_with_code(&state, &code, details).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            team_id: team.id(),
            message: format!("Successfully signed up for {}", team.name()),
            player,
        }),
    ))
}
