//! Ticket Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{UnknownVariant, UserRef};

closed_enum! {
    /// Ticket category
    Category, "category" {
        Hardware => "Hardware",
        Software => "Software",
        Network => "Network",
        Access => "Access",
        Other => "Other",
    }
}

closed_enum! {
    /// Ticket priority (defaults to Medium)
    Priority, "priority" {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

closed_enum! {
    /// Ticket lifecycle status (new tickets start Open)
    TicketStatus, "status" {
        Open => "Open",
        InProgress => "In Progress",
        Resolved => "Resolved",
        Closed => "Closed",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        TicketStatus::Open
    }
}

impl TicketStatus {
    /// Resolved and Closed tickets are finished; SLA no longer applies
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }
}

/// Stored file attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Original file name as uploaded
    pub filename: String,
    /// Storage path relative to the work directory (served under `/uploads`)
    pub path: String,
}

/// Derived SLA flags, recomputed on every read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaState {
    pub breached: bool,
    pub warning: bool,
}

/// One message in a ticket thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseView {
    pub user: UserRef,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Ticket as returned by the API, with references resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: TicketStatus,
    pub resolution_date: Option<DateTime<Utc>>,
    pub attachments: Vec<Attachment>,
    pub responses: Vec<ResponseView>,
    /// Ticket owner
    pub user: UserRef,
    pub last_updated_by: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sla: SlaState,
}

/// Partial ticket update payload
///
/// Enumerated fields travel as strings and are checked by the ticket engine.
/// `resolutionDate`: absent = unchanged, `null` or `""` = cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::util::double_option"
    )]
    pub resolution_date: Option<Option<String>>,
}

/// Add response payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseCreate {
    #[serde(default)]
    pub message: String,
}

/// Delete confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTicket {
    pub id: String,
}

/// Ticket count for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: u64,
}

/// Admin dashboard rollup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub in_progress_tickets: u64,
    pub resolved_tickets: u64,
    pub closed_tickets: u64,
    pub breached_tickets: u64,
    pub tickets_by_category: Vec<CategoryCount>,
}
