//! Ticket lifecycle engine
//!
//! Owns every ticket mutation and the rules gating it:
//! - a ticket is visible to its owner and to admins, nobody else
//! - the owner may edit text, category and priority; status and
//!   resolution date are admin-only
//! - responses are append-only, authored by the owner or an admin
//!
//! Not-found is decided before ownership, so a stranger learns nothing more
//! than "not yours" about an existing ticket.

use std::collections::HashMap;
use std::str::FromStr;

use shared::models::{
    Attachment, Category, DeletedTicket, Priority, ResponseView, TicketStatus, TicketUpdate,
    TicketView, UnknownVariant, UserRef,
};
use shared::util::{millis_to_datetime, now_millis};

use crate::auth::CurrentUser;
use crate::db::models::{Ticket, TicketChanges, TicketCreate};
use crate::db::repository::{TicketRepository, UserRepository};
use crate::security_log;
use crate::tickets::sla;
use crate::utils::time::{parse_optional_resolution_date, parse_resolution_date};
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_MESSAGE_LEN, MAX_TITLE_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Raw ticket form fields as submitted
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub resolution_date: Option<String>,
}

/// Validated ticket fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub resolution_date: Option<i64>,
}

impl TicketDraft {
    /// Check a submitted form
    ///
    /// title, description and category are required; priority defaults to
    /// Medium; a blank resolution date means none.
    pub fn parse(form: NewTicket) -> AppResult<Self> {
        let title = form.title.unwrap_or_default().trim().to_string();
        let description = form.description.unwrap_or_default().trim().to_string();
        let category = form.category.unwrap_or_default();

        validate_required_text(&title, "title", MAX_TITLE_LEN)?;
        validate_required_text(&description, "description", MAX_DESCRIPTION_LEN)?;
        if category.trim().is_empty() {
            return Err(AppError::required_field("category"));
        }

        let priority = match form.priority.as_deref().map(str::trim) {
            None | Some("") => Priority::default(),
            Some(p) => parse_enum(p, ErrorCode::InvalidPriority)?,
        };

        Ok(Self {
            title,
            description,
            category: parse_enum(&category, ErrorCode::InvalidCategory)?,
            priority,
            resolution_date: parse_optional_resolution_date(form.resolution_date.as_deref())?,
        })
    }
}

/// Parse a closed enumeration, mapping unknown values to `code`
fn parse_enum<T>(value: &str, code: ErrorCode) -> AppResult<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    value.trim().parse().map_err(|e: UnknownVariant| {
        AppError::with_message(code, e.to_string()).with_detail("value", e.value)
    })
}

/// Validate an update payload into typed changes
pub fn parse_changes(update: TicketUpdate) -> AppResult<TicketChanges> {
    let title = match update.title {
        Some(t) => {
            let t = t.trim().to_string();
            validate_required_text(&t, "title", MAX_TITLE_LEN)?;
            Some(t)
        }
        None => None,
    };
    let description = match update.description {
        Some(d) => {
            let d = d.trim().to_string();
            validate_required_text(&d, "description", MAX_DESCRIPTION_LEN)?;
            Some(d)
        }
        None => None,
    };
    let resolution_date = match update.resolution_date {
        None => None,
        Some(None) => Some(None),
        Some(Some(v)) if v.trim().is_empty() => Some(None),
        Some(Some(v)) => Some(Some(parse_resolution_date(&v)?)),
    };

    Ok(TicketChanges {
        title,
        description,
        category: update
            .category
            .map(|c| parse_enum::<Category>(&c, ErrorCode::InvalidCategory))
            .transpose()?,
        priority: update
            .priority
            .map(|p| parse_enum::<Priority>(&p, ErrorCode::InvalidPriority))
            .transpose()?,
        status: update
            .status
            .map(|s| parse_enum::<TicketStatus>(&s, ErrorCode::InvalidTicketStatus))
            .transpose()?,
        resolution_date,
    })
}

/// Accept `abc`, `ticket:abc` or `ticket:⟨abc⟩`
pub fn normalize_ticket_id(id: &str) -> &str {
    let id = id.trim();
    let id = id.strip_prefix("ticket:").unwrap_or(id);
    id.trim_start_matches('⟨').trim_end_matches('⟩')
}

/// Owner-or-admin rule
pub fn can_access(caller: &CurrentUser, ticket: &Ticket) -> bool {
    caller.is_admin() || ticket.owner == caller.id
}

#[derive(Clone)]
pub struct TicketService {
    tickets: TicketRepository,
    users: UserRepository,
}

impl TicketService {
    pub fn new(tickets: TicketRepository, users: UserRepository) -> Self {
        Self { tickets, users }
    }

    /// Create a ticket owned by the caller (status Open)
    ///
    /// Only admins may set a resolution date up front.
    pub async fn create(
        &self,
        caller: &CurrentUser,
        draft: TicketDraft,
        attachments: Vec<Attachment>,
    ) -> AppResult<TicketView> {
        if !caller.is_admin() && draft.resolution_date.is_some() {
            security_log!("WARN", "ticket_admin_field_denied", user_id = caller.id);
            return Err(AppError::permission_denied(
                "Only administrators can set a resolution date",
            ));
        }

        let now = now_millis();
        let ticket = self
            .tickets
            .create(
                TicketCreate {
                    title: draft.title,
                    description: draft.description,
                    category: draft.category,
                    priority: draft.priority,
                    resolution_date: draft.resolution_date,
                    attachments,
                    owner: caller.id.clone(),
                },
                now,
            )
            .await?;

        tracing::info!(
            ticket_id = %ticket.id,
            owner = %caller.id,
            category = %ticket.category,
            attachments = ticket.attachments.len(),
            "Ticket created"
        );
        self.render_one(ticket, now).await
    }

    /// One ticket with references resolved
    pub async fn get(&self, caller: &CurrentUser, id: &str) -> AppResult<TicketView> {
        let ticket = self.load_authorized(caller, id, "view").await?;
        self.render_one(ticket, now_millis()).await
    }

    /// Admins see every ticket, users their own; newest first
    pub async fn list(&self, caller: &CurrentUser) -> AppResult<Vec<TicketView>> {
        let tickets = if caller.is_admin() {
            self.tickets.find_all().await?
        } else {
            self.tickets.find_by_owner(&caller.id).await?
        };
        self.render_many(tickets, now_millis()).await
    }

    /// Apply a partial update
    pub async fn update(
        &self,
        caller: &CurrentUser,
        id: &str,
        update: TicketUpdate,
    ) -> AppResult<TicketView> {
        let ticket = self.load_authorized(caller, id, "update").await?;
        let changes = parse_changes(update)?;

        if !caller.is_admin() && changes.touches_admin_fields() {
            security_log!(
                "WARN",
                "ticket_admin_field_denied",
                user_id = caller.id,
                ticket_id = ticket.id
            );
            return Err(AppError::permission_denied(
                "Only administrators can change status or resolution date",
            ));
        }

        let now = now_millis();
        let updated = self
            .tickets
            .update(&ticket.id, changes, &caller.id, now)
            .await
            .map_err(|e| not_found_as_ticket(e, &ticket.id))?;

        tracing::info!(
            ticket_id = %updated.id,
            updated_by = %caller.id,
            status = %updated.status,
            "Ticket updated"
        );
        self.render_one(updated, now).await
    }

    /// Permanently remove a ticket
    pub async fn delete(&self, caller: &CurrentUser, id: &str) -> AppResult<DeletedTicket> {
        let ticket = self.load_authorized(caller, id, "delete").await?;
        self.tickets.delete(&ticket.id).await?;

        tracing::info!(ticket_id = %ticket.id, deleted_by = %caller.id, "Ticket deleted");
        Ok(DeletedTicket { id: ticket.id })
    }

    /// Append a response to the thread
    pub async fn add_response(
        &self,
        caller: &CurrentUser,
        id: &str,
        message: &str,
    ) -> AppResult<TicketView> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyResponse));
        }
        validate_required_text(message, "message", MAX_MESSAGE_LEN)?;

        let ticket = self.load_authorized(caller, id, "respond").await?;

        let now = now_millis();
        let updated = self
            .tickets
            .append_response(&ticket.id, &caller.id, message, now)
            .await
            .map_err(|e| not_found_as_ticket(e, &ticket.id))?;

        tracing::info!(
            ticket_id = %updated.id,
            author = %caller.id,
            responses = updated.responses.len(),
            "Response added"
        );
        self.render_one(updated, now).await
    }

    /// Load a ticket and enforce owner-or-admin
    async fn load_authorized(
        &self,
        caller: &CurrentUser,
        id: &str,
        action: &str,
    ) -> AppResult<Ticket> {
        let key = normalize_ticket_id(id);
        if key.is_empty() {
            return Err(AppError::ticket_not_found(id));
        }

        let ticket = self
            .tickets
            .find_by_id(key)
            .await?
            .ok_or_else(|| AppError::ticket_not_found(key))?;

        if !can_access(caller, &ticket) {
            security_log!(
                "WARN",
                "ticket_access_denied",
                user_id = caller.id,
                ticket_id = ticket.id,
                action = action
            );
            return Err(AppError::not_ticket_owner());
        }
        Ok(ticket)
    }

    async fn render_one(&self, ticket: Ticket, now: i64) -> AppResult<TicketView> {
        let mut views = self.render_many(vec![ticket], now).await?;
        views
            .pop()
            .ok_or_else(|| AppError::internal("Ticket rendering produced no view"))
    }

    /// Resolve every referenced user in one lookup, then build views
    async fn render_many(&self, tickets: Vec<Ticket>, now: i64) -> AppResult<Vec<TicketView>> {
        let ids = referenced_users(&tickets);
        let users: HashMap<String, UserRef> = self
            .users
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u.to_ref()))
            .collect();

        Ok(tickets
            .into_iter()
            .map(|t| to_view(t, &users, now))
            .collect())
    }
}

fn not_found_as_ticket(err: crate::db::repository::RepoError, id: &str) -> AppError {
    match err {
        crate::db::repository::RepoError::NotFound(_) => AppError::ticket_not_found(id),
        other => other.into(),
    }
}

/// Distinct user keys referenced by owners, editors and response authors
fn referenced_users(tickets: &[Ticket]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let mut push = |id: &str| {
        if !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    };
    for ticket in tickets {
        push(&ticket.owner);
        if let Some(editor) = &ticket.last_updated_by {
            push(editor);
        }
        for response in &ticket.responses {
            push(&response.user);
        }
    }
    ids
}

fn resolve(users: &HashMap<String, UserRef>, id: &str) -> UserRef {
    users
        .get(id)
        .cloned()
        .unwrap_or_else(|| UserRef::unresolved(id))
}

/// Build the API view; SLA flags are computed for `now`
pub fn to_view(ticket: Ticket, users: &HashMap<String, UserRef>, now: i64) -> TicketView {
    let sla = sla::evaluate(ticket.status, ticket.resolution_date, now);
    TicketView {
        user: resolve(users, &ticket.owner),
        last_updated_by: ticket.last_updated_by.as_deref().map(|id| resolve(users, id)),
        responses: ticket
            .responses
            .into_iter()
            .map(|r| ResponseView {
                user: resolve(users, &r.user),
                message: r.message,
                created_at: millis_to_datetime(r.created_at),
            })
            .collect(),
        id: ticket.id,
        title: ticket.title,
        description: ticket.description,
        category: ticket.category,
        priority: ticket.priority,
        status: ticket.status,
        resolution_date: ticket.resolution_date.map(millis_to_datetime),
        attachments: ticket.attachments,
        created_at: millis_to_datetime(ticket.created_at),
        updated_at: millis_to_datetime(ticket.updated_at),
        sla,
    }
}
