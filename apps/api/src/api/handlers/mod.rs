// HTTP handlers grouped by resource

pub mod auth;
pub mod forms;
pub mod free_agents;
pub mod invitations;
pub mod leagues;
pub mod registrations;
pub mod teams;

use axum::extract::{FromRequest, FromRequestParts};

use crate::api::errors::ApiError;

/// JSON body whose rejections render as `{"error": ...}` with 400
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query string with the same error shape as [`AppJson`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);
