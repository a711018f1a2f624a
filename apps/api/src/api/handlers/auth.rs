use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppJson;
use crate::api::errors::ApiError;
use crate::api::middleware::CurrentUser;
use crate::auth::jwt::create_token;
use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
use crate::domain::repositories::RepositoryError;
use crate::domain::user::{Email, User, UserType};
use crate::state::AppState;

/// Request body for account registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Response from successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_team_captain: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl ProfileResponse {
    fn new(user: &User, is_team_captain: bool) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.as_str().to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            user_type: user.user_type,
            phone_number: user.phone_number.clone(),
            date_of_birth: user.date_of_birth,
            is_team_captain,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Register a new customer account
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let email = Email::new(&req.email)
        .map_err(|e| ApiError::bad_request(format!("Invalid email: {}", e)))?;

    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let password_hash = hash_password(&req.password)?;
    let mut user = User::new_customer(&req.username, email, password_hash, &req.first_name, &req.last_name)?;
    user.phone_number = req.phone_number.filter(|p| !p.trim().is_empty());
    user.date_of_birth = req.date_of_birth;

    // Duplicate username or email is a client error here, not a 409
    state.users.create(&user).await.map_err(|e| match e {
        RepositoryError::Conflict(message) => ApiError::bad_request(message),
        other => other.into(),
    })?;

    tracing::info!(user_id = %user.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Login with email and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = Email::new(&req.email)
        .map_err(|e| ApiError::bad_request(format!("Invalid email: {}", e)))?;

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !user.is_active {
        return Err(ApiError::unauthorized("Account is disabled"));
    }

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if let Err(e) = state.users.update_last_login(user.id).await {
        tracing::warn!(user_id = %user.id, error = %e, "failed to record last login");
    }

    let token = create_token(user.id, &state.config.jwt_secret)?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
    }))
}

/// GET /api/accounts/me
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let is_captain = state.teams.is_captain(user.id, &user.email).await?;
    Ok(Json(ProfileResponse::new(&user, is_captain)))
}

/// PUT /api/accounts/me
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    if let Some(first_name) = req.first_name {
        user.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = req.last_name {
        user.last_name = last_name.trim().to_string();
    }
    if let Some(phone) = req.phone_number {
        user.phone_number = Some(phone.trim().to_string()).filter(|p| !p.is_empty());
    }
    if req.date_of_birth.is_some() {
        user.date_of_birth = req.date_of_birth;
    }

    state.users.update_profile(&user).await?;
    let is_captain = state.teams.is_captain(user.id, &user.email).await?;
    Ok(Json(ProfileResponse::new(&user, is_captain)))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
