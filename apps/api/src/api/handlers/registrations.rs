use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::leagues::load_league;
use super::{AppJson, AppQuery};
use crate::api::errors::ApiError;
use crate::api::middleware::{AdminUser, CurrentUser};
use crate::domain::player::PersonalDetails;
use crate::domain::registration::{
    group_by_division, sort_for_management, DivisionGroup, LeagueRegistrationStats, ManagementStats,
    PaymentStatus, Registration, RegistrationFilter, RegistrationSummary,
};
use crate::services::catalog_sync::{self, SyncReport};
use crate::services::checkout::{self, CheckoutStarted};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ManagementResponse {
    pub divisions: Vec<DivisionGroup>,
    pub stats: ManagementStats,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub payment_status: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequestBody {
    pub division_id: Uuid,
    #[serde(flatten)]
    pub details: PersonalDetails,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

async fn sorted_summaries(
    state: &AppState,
    filter: &RegistrationFilter,
) -> Result<Vec<RegistrationSummary>, ApiError> {
    let mut summaries = state.registrations.summaries(filter).await?;
    sort_for_management(&mut summaries);
    Ok(summaries)
}

/// Registrations grouped by division and team
///
/// GET /api/registrations/manage
pub async fn manage(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppQuery(filter): AppQuery<RegistrationFilter>,
) -> Result<Json<ManagementResponse>, ApiError> {
    let summaries = sorted_summaries(&state, &filter).await?;
    Ok(Json(ManagementResponse {
        stats: ManagementStats::from_summaries(&summaries),
        divisions: group_by_division(&summaries),
    }))
}

/// POST /api/registrations/:id/update-status
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateStatusRequest>,
) -> Result<Json<Registration>, ApiError> {
    let status: PaymentStatus = req.payment_status.trim().parse().map_err(ApiError::bad_request)?;

    let mut registration = state
        .registrations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Registration not found: {}", id)))?;

    state.registrations.update_status(id, status).await?;
    registration.set_payment_status(status);
    tracing::info!(
        registration_id = %id,
        status = %status,
        admin_id = %admin.id,
        "registration payment status updated"
    );

    Ok(Json(registration))
}

/// GET /api/leagues/:id/registrations
pub async fn league_registrations(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    AppQuery(mut filter): AppQuery<RegistrationFilter>,
) -> Result<Json<Vec<RegistrationSummary>>, ApiError> {
    load_league(&state, id).await?;
    filter.league = Some(id);
    Ok(Json(sorted_summaries(&state, &filter).await?))
}

/// GET /api/leagues/:id/registration-stats
pub async fn league_registration_stats(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LeagueRegistrationStats>, ApiError> {
    load_league(&state, id).await?;
    let filter = RegistrationFilter {
        league: Some(id),
        ..RegistrationFilter::default()
    };
    let summaries = state.registrations.summaries(&filter).await?;
    let divisions = state.leagues.league_divisions(id).await?;
    Ok(Json(LeagueRegistrationStats::compute(&summaries, &divisions)))
}

/// POST /api/leagues/:id/checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<CheckoutRequestBody>,
) -> Result<Json<CheckoutStarted>, ApiError> {
    let started = checkout::start_checkout(&state, id, req.division_id, req.details, &req.notes).await?;
    Ok(Json(started))
}

/// GET /api/registrations/success?session_id=...
pub async fn success(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppQuery(query): AppQuery<SuccessQuery>,
) -> Result<Json<Registration>, ApiError> {
    let session_id = query
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("No session ID provided"))?;
    Ok(Json(checkout::complete_registration(&state, &user, &session_id).await?))
}

/// GET /api/registrations/cancel
pub async fn cancel(CurrentUser(_): CurrentUser) -> Json<Value> {
    Json(json!({ "message": "Registration canceled" }))
}

/// POST /api/admin/stripe/sync
pub async fn sync_catalog(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<SyncReport>, ApiError> {
    Ok(Json(catalog_sync::sync_catalog(&state).await?))
}
