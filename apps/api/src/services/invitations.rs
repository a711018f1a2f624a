//! Team invitation workflow.
//!
//! Expiry is lazy: every read or action first moves stale pending
//! invitations to EXPIRED and returns their free agent to the pool when
//! nothing else is outstanding.

use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use super::teams::{captained_teams, require_captain};
use super::{ServiceError, ServiceResult};
use crate::domain::errors::DomainError;
use crate::domain::invitation::{InvitationEvent, InvitationNotification, InvitationStatus, TeamInvitation};
use crate::domain::player::{FreeAgent, Player};
use crate::domain::user::User;
use crate::state::AppState;

fn record(event: &InvitationEvent) {
    match event {
        InvitationEvent::Sent {
            invitation_id,
            team_id,
            free_agent_id,
        }
        | InvitationEvent::Accepted {
            invitation_id,
            team_id,
            free_agent_id,
        } => tracing::info!(
            event = event.name(),
            invitation_id = %invitation_id,
            team_id = %team_id,
            free_agent_id = %free_agent_id,
            "invitation event"
        ),
        _ => tracing::info!(
            event = event.name(),
            invitation_id = %event.invitation_id(),
            "invitation event"
        ),
    }
}

async fn find_invitation(state: &AppState, id: Uuid) -> ServiceResult<TeamInvitation> {
    state
        .invitations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Invitation not found"))
}

async fn find_free_agent(state: &AppState, id: Uuid) -> ServiceResult<FreeAgent> {
    state
        .players
        .find_free_agent(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Free agent not found"))
}

/// Returns the free agent to AVAILABLE when no pending invitation remains
pub(crate) async fn release_if_idle(state: &AppState, free_agent_id: Uuid) -> ServiceResult<()> {
    let outstanding = state
        .invitations
        .for_free_agents(&[free_agent_id])
        .await?
        .iter()
        .any(TeamInvitation::is_pending);
    if outstanding {
        return Ok(());
    }
    let mut free_agent = find_free_agent(state, free_agent_id).await?;
    free_agent.release()?;
    state.players.update_free_agent(&free_agent).await?;
    Ok(())
}

/// Persists expiry for stale invitations and returns the refreshed list
async fn expire_stale(state: &AppState, mut invitations: Vec<TeamInvitation>) -> ServiceResult<Vec<TeamInvitation>> {
    let now = Utc::now();
    let window = state.config.invitation_expiry();
    for invitation in invitations.iter_mut() {
        if let Some(event) = invitation.expire_if_stale(now, window) {
            state.invitations.update(invitation).await?;
            release_if_idle(state, invitation.free_agent_id).await?;
            record(&event);
        }
    }
    Ok(invitations)
}

async fn refreshed(state: &AppState, id: Uuid) -> ServiceResult<TeamInvitation> {
    let invitation = find_invitation(state, id).await?;
    let mut list = expire_stale(state, vec![invitation]).await?;
    list.pop()
        .ok_or_else(|| ServiceError::not_found("Invitation not found"))
}

/// Invites a free agent to the caller's team in the same league
///
/// Re-inviting after a decline, expiry or cancellation reopens the same row.
pub async fn invite(
    state: &AppState,
    captain: &User,
    free_agent_id: Uuid,
    message: Option<String>,
) -> ServiceResult<TeamInvitation> {
    let teams = captained_teams(state, captain).await?;
    if teams.is_empty() {
        return Err(ServiceError::forbidden("You must be a team captain to invite free agents"));
    }

    let mut free_agent = find_free_agent(state, free_agent_id).await?;
    let team = teams
        .into_iter()
        .find(|t| t.league_id() == free_agent.league_id)
        .ok_or_else(|| DomainError::validation("You don't have a team in this free agent's league"))?;

    let existing = match state.invitations.find_for_pair(team.id(), free_agent.id).await? {
        Some(existing) => expire_stale(state, vec![existing]).await?.pop(),
        None => None,
    };
    let (invitation, event, reopened) = match existing {
        Some(mut existing) => {
            let event = existing.reopen(message)?;
            (existing, event, true)
        }
        None => {
            let (invitation, event) = TeamInvitation::new(team.id(), free_agent.id, message);
            (invitation, event, false)
        }
    };

    // Re-read: expiring the old row may have released the free agent
    free_agent = find_free_agent(state, free_agent.id).await?;
    if !free_agent.status.is_invitable() {
        return Err(DomainError::validation(format!(
            "This free agent is {} and cannot be invited",
            free_agent.status
        ))
        .into());
    }

    if reopened {
        state.invitations.update(&invitation).await?;
    } else {
        state.invitations.create(&invitation).await?;
    }
    free_agent.mark_invited()?;
    state.players.update_free_agent(&free_agent).await?;

    let notification = InvitationNotification::new(free_agent.user_id, invitation.id);
    state.invitations.create_notification(&notification).await?;

    record(&event);
    Ok(invitation)
}

/// Joins the team: creates the player and cancels every other pending offer
pub async fn accept(state: &AppState, user: &User, invitation_id: Uuid) -> ServiceResult<(TeamInvitation, Player)> {
    let mut invitation = refreshed(state, invitation_id).await?;
    let mut free_agent = find_free_agent(state, invitation.free_agent_id).await?;
    if free_agent.user_id != user.id {
        return Err(ServiceError::forbidden("You can only respond to your own invitations"));
    }

    let mut events = vec![invitation.accept(Utc::now())?];
    free_agent.mark_joined()?;
    let player = Player::new(free_agent.details.clone(), Some(user.id), Some(invitation.team_id))?;

    let mut cancelled = Vec::new();
    for mut other in state.invitations.for_free_agents(&[free_agent.id]).await? {
        if other.id != invitation.id && other.is_pending() {
            events.push(other.cancel()?);
            cancelled.push(other);
        }
    }

    state
        .invitations
        .record_acceptance(&invitation, &free_agent, &player, &cancelled)
        .await?;
    events.iter().for_each(record);

    Ok((invitation, player))
}

pub async fn decline(state: &AppState, user: &User, invitation_id: Uuid) -> ServiceResult<TeamInvitation> {
    let mut invitation = refreshed(state, invitation_id).await?;
    let free_agent = find_free_agent(state, invitation.free_agent_id).await?;
    if free_agent.user_id != user.id {
        return Err(ServiceError::forbidden("You can only respond to your own invitations"));
    }

    let event = invitation.decline(Utc::now())?;
    state.invitations.update(&invitation).await?;
    release_if_idle(state, free_agent.id).await?;
    record(&event);
    Ok(invitation)
}

pub async fn cancel(state: &AppState, user: &User, invitation_id: Uuid) -> ServiceResult<TeamInvitation> {
    let mut invitation = refreshed(state, invitation_id).await?;
    require_captain(state, user, invitation.team_id).await?;

    let event = invitation.cancel()?;
    state.invitations.update(&invitation).await?;
    release_if_idle(state, invitation.free_agent_id).await?;
    record(&event);
    Ok(invitation)
}

/// Invitations from every team the caller captains, keyed by status
///
/// All five statuses are present, newest first within each.
pub async fn sent(state: &AppState, captain: &User) -> ServiceResult<BTreeMap<InvitationStatus, Vec<TeamInvitation>>> {
    let teams = captained_teams(state, captain).await?;
    if teams.is_empty() {
        return Err(ServiceError::forbidden("You must be a team captain to view sent invitations"));
    }
    let ids: Vec<Uuid> = teams.iter().map(|t| t.id()).collect();
    let invitations = expire_stale(state, state.invitations.for_teams(&ids).await?).await?;
    Ok(group_by_status(invitations))
}

pub fn group_by_status(invitations: Vec<TeamInvitation>) -> BTreeMap<InvitationStatus, Vec<TeamInvitation>> {
    let mut grouped: BTreeMap<InvitationStatus, Vec<TeamInvitation>> =
        InvitationStatus::ALL.iter().map(|s| (*s, Vec::new())).collect();
    for invitation in invitations {
        grouped.entry(invitation.status).or_default().push(invitation);
    }
    grouped
}

/// Invitations addressed to any of the caller's free-agent profiles
pub async fn received(state: &AppState, user: &User) -> ServiceResult<Vec<TeamInvitation>> {
    let ids: Vec<Uuid> = state
        .players
        .free_agents_of_user(user.id)
        .await?
        .iter()
        .map(|f| f.id)
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    expire_stale(state, state.invitations.for_free_agents(&ids).await?).await
}

/// Pending invitations of one team; captain only
pub async fn team_pending(state: &AppState, user: &User, team_id: Uuid) -> ServiceResult<Vec<TeamInvitation>> {
    require_captain(state, user, team_id).await?;
    let invitations = expire_stale(state, state.invitations.for_teams(&[team_id]).await?).await?;
    Ok(invitations.into_iter().filter(TeamInvitation::is_pending).collect())
}
