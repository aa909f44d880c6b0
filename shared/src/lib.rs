//! Shared types for the help-desk service
//!
//! Wire types used by the server and its clients: the unified error system,
//! user and ticket models, auth DTOs and time helpers.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
