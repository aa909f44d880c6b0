//! Unified error handling
//!
//! Handlers return [`AppError`] from `shared::error`; it renders as
//! `{code, message, details?}` with the status from [`ErrorCode::http_status`].
//! Internal errors convert into it here.
//!
//! ```ignore
//! Err(AppError::ticket_not_found(&id))
//! ```

use axum::extract::multipart::MultipartError;

use crate::db::repository::RepoError;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Malformed multipart body
pub fn multipart_error(e: MultipartError) -> AppError {
    AppError::invalid(format!("Multipart error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_repo_error_mapping() {
        let err = AppError::from(RepoError::Database("disk full".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::from(RepoError::Duplicate("email".into()));
        assert_eq!(err.code, ErrorCode::AlreadyExists);

        let err = AppError::from(RepoError::NotFound("Ticket x not found".into()));
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);

        let err = AppError::from(RepoError::Validation("bad".into()));
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }
}
