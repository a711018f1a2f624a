use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::leagues::load_league;
use super::{AppJson, AppQuery};
use crate::api::errors::ApiError;
use crate::api::middleware::CurrentUser;
use crate::domain::invitation::TeamInvitation;
use crate::domain::player::{FreeAgent, PersonalDetails};
use crate::services::invitations;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterFreeAgentRequest {
    pub division_id: Uuid,
    #[serde(flatten)]
    pub details: PersonalDetails,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct PoolQuery {
    pub division: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FreeAgentWithInvitations {
    #[serde(flatten)]
    pub free_agent: FreeAgent,
    pub invitations: Vec<TeamInvitation>,
}

#[derive(Debug, Serialize)]
pub struct LeagueFreeAgents {
    pub league_id: Uuid,
    pub league_name: String,
    pub registrations: Vec<FreeAgentWithInvitations>,
}

/// POST /api/free-agents/league/:league_id
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(league_id): Path<Uuid>,
    AppJson(req): AppJson<RegisterFreeAgentRequest>,
) -> Result<(StatusCode, Json<FreeAgent>), ApiError> {
    let league = load_league(&state, league_id).await?;
    let free_agent = FreeAgent::register(user.id, &league, req.division_id, req.details, &req.notes)?;

    state.players.create_free_agent(&free_agent).await?;
    tracing::info!(
        free_agent_id = %free_agent.id,
        league_id = %league_id,
        user_id = %user.id,
        "free agent registered"
    );

    Ok((StatusCode::CREATED, Json(free_agent)))
}

/// Available free agents of a league; team captains only
///
/// GET /api/free-agents/league/:league_id
pub async fn pool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(league_id): Path<Uuid>,
    AppQuery(query): AppQuery<PoolQuery>,
) -> Result<Json<Vec<FreeAgent>>, ApiError> {
    if !state.teams.is_captain(user.id, &user.email).await? {
        return Err(ApiError::forbidden("Only team captains can browse free agents"));
    }
    load_league(&state, league_id).await?;
    let free_agents = state
        .players
        .available_free_agents(league_id, query.division)
        .await?;
    Ok(Json(free_agents))
}

/// The caller's free-agent profiles grouped by league, newest first
///
/// GET /api/free-agents/mine
pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<LeagueFreeAgents>>, ApiError> {
    let profiles = state.players.free_agents_of_user(user.id).await?;
    let mut received = invitations::received(&state, &user).await?;

    let mut grouped: Vec<LeagueFreeAgents> = Vec::new();
    for free_agent in profiles {
        let (mine, rest): (Vec<_>, Vec<_>) = received
            .into_iter()
            .partition(|i| i.free_agent_id == free_agent.id);
        received = rest;

        let entry = FreeAgentWithInvitations {
            free_agent,
            invitations: mine,
        };
        match grouped.iter_mut().find(|g| g.league_id == entry.free_agent.league_id) {
            Some(group) => group.registrations.push(entry),
            None => {
                let league = load_league(&state, entry.free_agent.league_id).await?;
                grouped.push(LeagueFreeAgents {
                    league_id: league.id(),
                    league_name: league.name().to_string(),
                    registrations: vec![entry],
                });
            }
        }
    }

    Ok(Json(grouped))
}

/// GET /api/free-agents/:id
pub async fn get_free_agent(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FreeAgent>, ApiError> {
    let free_agent = state
        .players
        .find_free_agent(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Free agent not found: {}", id)))?;
    Ok(Json(free_agent))
}

/// POST /api/free-agents/:id/invite
pub async fn invite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<InviteRequest>,
) -> Result<(StatusCode, Json<TeamInvitation>), ApiError> {
    let invitation = invitations::invite(&state, &user, id, req.message).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}
