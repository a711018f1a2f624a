use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::CurrentUser;
use crate::domain::invitation::{InvitationNotification, InvitationStatus, TeamInvitation};
use crate::domain::player::Player;
use crate::services::invitations;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub invitation: TeamInvitation,
    pub player: Player,
    pub message: String,
}

/// GET /api/invitations/sent
pub async fn sent(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<BTreeMap<InvitationStatus, Vec<TeamInvitation>>>, ApiError> {
    Ok(Json(invitations::sent(&state, &user).await?))
}

/// GET /api/invitations/received
pub async fn received(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<TeamInvitation>>, ApiError> {
    Ok(Json(invitations::received(&state, &user).await?))
}

/// POST /api/invitations/:id/accept
pub async fn accept(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AcceptResponse>, ApiError> {
    let (invitation, player) = invitations::accept(&state, &user, id).await?;
    Ok(Json(AcceptResponse {
        invitation,
        player,
        message: "Invitation accepted".to_string(),
    }))
}

/// POST /api/invitations/:id/decline
pub async fn decline(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamInvitation>, ApiError> {
    Ok(Json(invitations::decline(&state, &user, id).await?))
}

/// POST /api/invitations/:id/cancel
pub async fn cancel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamInvitation>, ApiError> {
    Ok(Json(invitations::cancel(&state, &user, id).await?))
}

/// GET /api/notifications
pub async fn notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<InvitationNotification>>, ApiError> {
    Ok(Json(state.invitations.notifications_for_user(user.id).await?))
}

/// POST /api/notifications/:id/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InvitationNotification>, ApiError> {
    // Someone else's notification is reported as missing
    let mut notification = state
        .invitations
        .find_notification(id)
        .await?
        .filter(|n| n.user_id == user.id)
        .ok_or_else(|| ApiError::not_found(format!("Notification not found: {}", id)))?;

    notification.mark_read(Utc::now());
    state.invitations.update_notification(&notification).await?;
    Ok(Json(notification))
}
