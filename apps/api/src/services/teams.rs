//! Team creation, captaincy checks and roster changes.

use serde::Deserialize;
use uuid::Uuid;

use super::invitations::release_if_idle;
use super::{ServiceError, ServiceResult};
use crate::domain::invitation::TeamInvitation;
use crate::domain::player::{PersonalDetails, Player};
use crate::domain::repositories::RepositoryError;
use crate::domain::team::{SignupCode, Team, TeamCaptain};
use crate::domain::user::{Email, User};
use crate::state::AppState;

const SIGNUP_CODE_ATTEMPTS: usize = 16;

/// Captain contact details supplied when an admin creates a team
#[derive(Debug, Clone, Deserialize)]
pub struct CaptainInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    #[serde(default)]
    pub phone_number: String,
}

/// Draws random codes until one is not used by any team
pub async fn unique_signup_code(state: &AppState) -> ServiceResult<SignupCode> {
    for _ in 0..SIGNUP_CODE_ATTEMPTS {
        let code = SignupCode::random();
        if !state.teams.signup_code_exists(&code).await? {
            return Ok(code);
        }
        tracing::debug!(code = %code, "signup code collision, drawing again");
    }
    Err(RepositoryError::conflict("Could not allocate a unique signup code").into())
}

/// Existing captain with this email, or a new unlinked one
async fn resolve_captain(state: &AppState, input: Option<CaptainInput>) -> ServiceResult<TeamCaptain> {
    match input {
        Some(input) => {
            if let Some(existing) = state.teams.find_captain_by_email(&input.email).await? {
                return Ok(existing);
            }
            let captain = TeamCaptain::new(
                &input.first_name,
                &input.last_name,
                input.email,
                &input.phone_number,
            )?;
            state.teams.save_captain(&captain).await?;
            Ok(captain)
        }
        None => {
            if let Some(system) = state.teams.find_system_captain().await? {
                return Ok(system);
            }
            let system = TeamCaptain::system();
            state.teams.save_captain(&system).await?;
            tracing::info!(captain_id = %system.id, "created system captain");
            Ok(system)
        }
    }
}

pub async fn create_team(
    state: &AppState,
    name: &str,
    league_id: Uuid,
    division_id: Uuid,
    captain: Option<CaptainInput>,
) -> ServiceResult<(Team, TeamCaptain)> {
    let league = state
        .leagues
        .find_league(league_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("League not found"))?;
    let division = state
        .leagues
        .find_division(division_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Division not found"))?;

    let captain = resolve_captain(state, captain).await?;
    let code = unique_signup_code(state).await?;
    let team = Team::new(name, &league, &division, captain.id, code)?;
    state.teams.save(&team).await?;

    tracing::info!(
        team_id = %team.id(),
        league_id = %league.id(),
        signup_code = %team.signup_code(),
        "team created"
    );
    Ok((team, captain))
}

pub async fn find_team(state: &AppState, team_id: Uuid) -> ServiceResult<Team> {
    state
        .teams
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Team not found: {}", team_id)))
}

/// Deletes a team and returns the free agents it alone had invited to the pool
///
/// Storage drops the team's invitations with it, so the pending ones are
/// collected before the delete.
pub async fn delete_team(state: &AppState, team_id: Uuid) -> ServiceResult<()> {
    find_team(state, team_id).await?;
    let invited: Vec<Uuid> = state
        .invitations
        .for_teams(&[team_id])
        .await?
        .into_iter()
        .filter(TeamInvitation::is_pending)
        .map(|i| i.free_agent_id)
        .collect();

    state.teams.delete(team_id).await?;
    for free_agent_id in &invited {
        release_if_idle(state, *free_agent_id).await?;
    }

    tracing::info!(team_id = %team_id, released = invited.len(), "team deleted");
    Ok(())
}

pub async fn team_captain(state: &AppState, team: &Team) -> ServiceResult<TeamCaptain> {
    state
        .teams
        .find_captain(team.captain_id())
        .await?
        .ok_or_else(|| ServiceError::not_found("Team captain not found"))
}

/// Loads the team and fails unless `user` captains it
pub async fn require_captain(state: &AppState, user: &User, team_id: Uuid) -> ServiceResult<(Team, TeamCaptain)> {
    let team = find_team(state, team_id).await?;
    let captain = team_captain(state, &team).await?;
    if !captain.is_held_by(user) {
        return Err(ServiceError::forbidden("Only the team captain can do this"));
    }
    Ok((team, captain))
}

/// Teams the user captains: linked ones plus unlinked ones carrying the user's email
pub async fn captained_teams(state: &AppState, user: &User) -> ServiceResult<Vec<Team>> {
    let mut teams = state.teams.find_by_captain_user(user.id).await?;
    for team in state.teams.find_claimable(&user.email).await? {
        if !teams.iter().any(|t| t.id() == team.id()) {
            teams.push(team);
        }
    }
    teams.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(teams)
}

pub async fn claim_team(state: &AppState, user: &User, team_id: Uuid) -> ServiceResult<(Team, TeamCaptain)> {
    let team = find_team(state, team_id).await?;
    let mut captain = team_captain(state, &team).await?;
    if !captain.is_claimable_by(user) {
        return Err(ServiceError::forbidden("You are not authorized to claim this team."));
    }
    captain.claim(user)?;
    state.teams.save_captain(&captain).await?;
    tracing::info!(team_id = %team.id(), user_id = %user.id, "team captaincy claimed");
    Ok((team, captain))
}

/// Creates a player on the team behind a signup code
pub async fn signup_with_code(
    state: &AppState,
    code: &str,
    details: PersonalDetails,
) -> ServiceResult<(Team, Player)> {
    let code = SignupCode::parse(code).map_err(|_| ServiceError::not_found("Invalid signup code"))?;
    let team = state
        .teams
        .find_by_signup_code(&code)
        .await?
        .ok_or_else(|| ServiceError::not_found("Invalid signup code"))?;

    let player = Player::new(details, None, Some(team.id()))?;
    state.players.save_player(&player).await?;
    tracing::info!(team_id = %team.id(), player_id = %player.id, "player joined via signup code");
    Ok((team, player))
}

pub async fn assign_player(state: &AppState, team_id: Uuid, player_id: Uuid) -> ServiceResult<Player> {
    let team = find_team(state, team_id).await?;
    let mut player = state
        .players
        .find_player(player_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Player not found"))?;
    player.team_id = Some(team.id());
    state.players.save_player(&player).await?;
    tracing::info!(team_id = %team.id(), player_id = %player.id, "player assigned to team");
    Ok(player)
}

/// Clears the player's team; allowed for the team captain and admins
pub async fn remove_player(state: &AppState, user: &User, team_id: Uuid, player_id: Uuid) -> ServiceResult<Player> {
    if !user.is_admin() {
        require_captain(state, user, team_id).await?;
    }
    let mut player = state
        .players
        .find_player(player_id)
        .await?
        .filter(|p| p.team_id == Some(team_id))
        .ok_or_else(|| ServiceError::not_found("Player is not on this team"))?;
    player.team_id = None;
    state.players.save_player(&player).await?;
    tracing::info!(team_id = %team_id, player_id = %player.id, "player removed from team");
    Ok(player)
}
