//! API routes
//!
//! - [`health`] - liveness
//! - [`auth`] - register, login, profile
//! - [`tickets`] - ticket lifecycle and responses
//! - [`dashboard`] - admin metrics
//! - [`upload`] - stored attachment files

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod tickets;
pub mod upload;

use axum::Json;
use axum::extract::rejection::JsonRejection;

use crate::utils::{AppError, AppResult};

/// Unwrap a JSON body, turning axum's rejection into a 400 `AppError`
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::invalid(rejection.body_text()))
}
