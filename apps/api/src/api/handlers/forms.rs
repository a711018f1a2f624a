use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::leagues::load_league;
use super::AppJson;
use crate::api::errors::ApiError;
use crate::api::middleware::{AdminUser, CurrentUser};
use crate::domain::forms::{DynamicForm, FieldType, FormField, FormResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct AddFieldRequest {
    pub label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub choices: Vec<String>,
    /// Appended after the last field when omitted
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub answers: BTreeMap<Uuid, Value>,
}

#[derive(Debug, Serialize)]
pub struct FormWithFields {
    #[serde(flatten)]
    pub form: DynamicForm,
    pub fields: Vec<FormField>,
}

/// Active form of a league with its fields
///
/// GET /api/leagues/:id/form
pub async fn active_form(
    State(state): State<AppState>,
    Path(league_id): Path<Uuid>,
) -> Result<Json<FormWithFields>, ApiError> {
    let form = state
        .forms
        .active_form(league_id)
        .await?
        .ok_or_else(|| ApiError::not_found("This league has no registration form"))?;
    let fields = state.forms.fields(form.id).await?;
    Ok(Json(FormWithFields { form, fields }))
}

/// Creates the league's form, retiring the previous one
///
/// POST /api/leagues/:id/form
pub async fn create_form(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(league_id): Path<Uuid>,
    AppJson(req): AppJson<CreateFormRequest>,
) -> Result<(StatusCode, Json<DynamicForm>), ApiError> {
    load_league(&state, league_id).await?;
    let form = DynamicForm::new(league_id, &req.title, &req.description)?;
    state.forms.create_form(&form).await?;
    tracing::info!(form_id = %form.id, league_id = %league_id, "registration form created");
    Ok((StatusCode::CREATED, Json(form)))
}

/// POST /api/forms/:id/fields
pub async fn add_field(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(form_id): Path<Uuid>,
    AppJson(req): AppJson<AddFieldRequest>,
) -> Result<(StatusCode, Json<FormField>), ApiError> {
    state
        .forms
        .find_form(form_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Form not found: {}", form_id)))?;

    let position = match req.position {
        Some(position) => position,
        None => state
            .forms
            .fields(form_id)
            .await?
            .iter()
            .map(|f| f.position + 1)
            .max()
            .unwrap_or(0),
    };

    let field = FormField::new(form_id, &req.label, req.field_type, req.required, req.choices, position)?;
    state.forms.add_field(&field).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

/// Answers the league's active form for one registration
///
/// POST /api/registrations/:id/form-response
pub async fn submit_response(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(registration_id): Path<Uuid>,
    AppJson(req): AppJson<SubmitResponseRequest>,
) -> Result<(StatusCode, Json<FormResponse>), ApiError> {
    let registration = state
        .registrations
        .find_by_id(registration_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Registration not found: {}", registration_id)))?;

    if !user.is_admin() {
        let owner = state
            .players
            .find_player(registration.player_id)
            .await?
            .and_then(|p| p.user_id);
        if owner != Some(user.id) {
            return Err(ApiError::forbidden("You can only answer forms for your own registrations"));
        }
    }

    let form = state
        .forms
        .active_form(registration.league_id)
        .await?
        .ok_or_else(|| ApiError::not_found("This league has no registration form"))?;
    let fields = state.forms.fields(form.id).await?;

    let response = FormResponse::submit(&form, &fields, registration.id, req.answers)?;
    state.forms.save_response(&response).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
