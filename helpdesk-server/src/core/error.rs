use thiserror::Error;

use crate::auth::JwtError;
use crate::utils::AppError;

/// Errors raised while starting or running the server
///
/// Request-level failures use [`AppError`]; this type never reaches a client.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JwtError> for ServerError {
    fn from(err: JwtError) -> Self {
        ServerError::Config(err.to_string())
    }
}

impl From<AppError> for ServerError {
    fn from(err: AppError) -> Self {
        ServerError::Database(err.message)
    }
}

/// Result alias for startup code
pub type Result<T> = std::result::Result<T, ServerError>;
