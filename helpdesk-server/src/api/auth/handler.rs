//! Authentication Handlers

use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State};
use http::StatusCode;
use shared::client::{AuthResponse, LoginRequest, RegisterRequest};
use shared::models::UserProfile;

use crate::AppError;
use crate::api::json_body;
use crate::auth::CurrentUser;
use crate::core::ServerState;

/// Register handler
///
/// Creates the account and returns it with a token
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let req = json_body(payload)?;
    let response = state.identity().register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login handler
///
/// Authenticates credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let req = json_body(payload)?;
    let response = state.identity().login(req).await?;
    Ok(Json(response))
}

/// Current user profile
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> Json<UserProfile> {
    Json(state.identity().me(&user))
}
