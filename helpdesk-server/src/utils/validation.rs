//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Ticket titles
pub const MAX_TITLE_LEN: usize = 200;

/// Ticket descriptions
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Response messages
pub const MAX_MESSAGE_LEN: usize = 5000;

/// Display names
pub const MAX_NAME_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-blank and within the length limit.
///
/// Blank → `RequiredField` ("Please add all fields"), too long → `ValidationFailed`.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::required_field(field));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        )));
    }
    Ok(())
}
