//! Utilities - shared error types, logging, validation, time parsing
//!
//! - [`AppError`] - application error (from shared::error)
//! - [`ApiResponse`] - JSON error body (from shared::error)

pub mod error;
pub mod logger;
pub mod time;
pub mod validation;

// Re-export error types from the error module (which re-exports from shared)
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
