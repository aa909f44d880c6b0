//! Unified error codes for the help-desk service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Ticket errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Email is already registered
    EmailAlreadyRegistered = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Caller is neither the ticket owner nor an admin
    NotTicketOwner = 2006,

    // ==================== 4xxx: Ticket ====================
    /// Ticket not found
    TicketNotFound = 4001,
    /// Unknown ticket status
    InvalidTicketStatus = 4002,
    /// Unknown ticket priority
    InvalidPriority = 4003,
    /// Unknown ticket category
    InvalidCategory = 4004,
    /// Too many attachments in one request
    TooManyAttachments = 4005,
    /// Response message is empty
    EmptyResponse = 4006,
    /// Attachment exceeds the size limit
    AttachmentTooLarge = 4007,
    /// Attachment type is not accepted
    UnsupportedAttachment = 4008,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// File storage error
    StorageError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Please add all fields",

            // Auth
            ErrorCode::NotAuthenticated => "Not authorized, no token",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenInvalid => "Not authorized, token failed",
            ErrorCode::EmailAlreadyRegistered => "User already exists",

            // Permission
            ErrorCode::PermissionDenied => "Not authorized",
            ErrorCode::AdminRequired => "Not authorized as an admin",
            ErrorCode::NotTicketOwner => "Not authorized",

            // Ticket
            ErrorCode::TicketNotFound => "Ticket not found",
            ErrorCode::InvalidTicketStatus => "Invalid ticket status",
            ErrorCode::InvalidPriority => "Invalid ticket priority",
            ErrorCode::InvalidCategory => "Invalid ticket category",
            ErrorCode::TooManyAttachments => "Too many attachments",
            ErrorCode::EmptyResponse => "Please add a message",
            ErrorCode::AttachmentTooLarge => "Attachment is too large",
            ErrorCode::UnsupportedAttachment => "Unsupported attachment type",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::StorageError => "File storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::EmailAlreadyRegistered),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2006 => Ok(ErrorCode::NotTicketOwner),

            // Ticket
            4001 => Ok(ErrorCode::TicketNotFound),
            4002 => Ok(ErrorCode::InvalidTicketStatus),
            4003 => Ok(ErrorCode::InvalidPriority),
            4004 => Ok(ErrorCode::InvalidCategory),
            4005 => Ok(ErrorCode::TooManyAttachments),
            4006 => Ok(ErrorCode::EmptyResponse),
            4007 => Ok(ErrorCode::AttachmentTooLarge),
            4008 => Ok(ErrorCode::UnsupportedAttachment),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
