//! Ticket Record

use serde::{Deserialize, Serialize};
use shared::models::{Attachment, Category, Priority, TicketStatus};

/// Ticket record as stored
///
/// Timestamps are Unix milliseconds. `owner`, `last_updated_by` and
/// response authors are user keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub resolution_date: Option<i64>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub responses: Vec<TicketResponse>,
    pub owner: String,
    #[serde(default)]
    pub last_updated_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One entry of the append-only response thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketResponse {
    pub user: String,
    pub message: String,
    pub created_at: i64,
}

/// Validated fields for a new ticket
#[derive(Debug, Clone)]
pub struct TicketCreate {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub resolution_date: Option<i64>,
    pub attachments: Vec<Attachment>,
    pub owner: String,
}

/// Validated partial update
///
/// `resolution_date`: `None` = unchanged, `Some(None)` = cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<TicketStatus>,
    pub resolution_date: Option<Option<i64>>,
}

impl TicketChanges {
    /// Whether any admin-only field is touched
    pub fn touches_admin_fields(&self) -> bool {
        self.status.is_some() || self.resolution_date.is_some()
    }
}

/// Minimal projection used by the metrics reporter
#[derive(Debug, Clone, Deserialize)]
pub struct TicketSnapshot {
    pub status: TicketStatus,
    pub category: Category,
    #[serde(default)]
    pub resolution_date: Option<i64>,
}
