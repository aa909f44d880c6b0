//! Ticket Repository

use super::{BaseRepository, RepoError, RepoResult, new_key, retry_on_conflict};
use crate::db::models::{Ticket, TicketChanges, TicketCreate, TicketSnapshot};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TICKET_FIELDS: &str = "record::id(id) AS id, title, description, category, priority, \
     status, resolution_date, attachments, responses, owner, last_updated_by, \
     created_at, updated_at";

#[derive(Clone)]
pub struct TicketRepository {
    base: BaseRepository,
}

impl TicketRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find ticket by key
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Ticket>> {
        let mut result = self
            .base
            .db()
            .query(format!(
                "SELECT {TICKET_FIELDS} FROM type::thing('ticket', $id)"
            ))
            .bind(("id", id.to_string()))
            .await?;
        let tickets: Vec<Ticket> = result.take(0)?;
        Ok(tickets.into_iter().next())
    }

    /// All tickets, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Ticket>> {
        let tickets: Vec<Ticket> = self
            .base
            .db()
            .query(format!(
                "SELECT {TICKET_FIELDS} FROM ticket ORDER BY created_at DESC, id DESC"
            ))
            .await?
            .take(0)?;
        Ok(tickets)
    }

    /// Tickets owned by `owner`, newest first
    pub async fn find_by_owner(&self, owner: &str) -> RepoResult<Vec<Ticket>> {
        let tickets: Vec<Ticket> = self
            .base
            .db()
            .query(format!(
                "SELECT {TICKET_FIELDS} FROM ticket WHERE owner = $owner \
                 ORDER BY created_at DESC, id DESC"
            ))
            .bind(("owner", owner.to_string()))
            .await?
            .take(0)?;
        Ok(tickets)
    }

    /// Status / category / deadline of every ticket
    pub async fn snapshot(&self) -> RepoResult<Vec<TicketSnapshot>> {
        let rows: Vec<TicketSnapshot> = self
            .base
            .db()
            .query("SELECT status, category, resolution_date FROM ticket")
            .await?
            .take(0)?;
        Ok(rows)
    }

    /// Create a ticket (status Open, empty thread)
    pub async fn create(&self, data: TicketCreate, now: i64) -> RepoResult<Ticket> {
        let key = new_key();
        self.base
            .db()
            .query(
                r#"CREATE type::thing('ticket', $key) CONTENT {
                    title: $title,
                    description: $description,
                    category: $category,
                    priority: $priority,
                    status: 'Open',
                    resolution_date: $resolution_date,
                    attachments: $attachments,
                    responses: [],
                    owner: $owner,
                    created_at: $now,
                    updated_at: $now
                } RETURN NONE"#,
            )
            .bind(("key", key.clone()))
            .bind(("title", data.title))
            .bind(("description", data.description))
            .bind(("category", data.category.as_str()))
            .bind(("priority", data.priority.as_str()))
            .bind(("resolution_date", data.resolution_date))
            .bind(("attachments", data.attachments))
            .bind(("owner", data.owner))
            .bind(("now", now))
            .await?
            .check()?;

        self.find_by_id(&key)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create ticket".to_string()))
    }

    /// Apply a partial update and stamp `last_updated_by` / `updated_at`
    ///
    /// Last writer wins; there is no revision check. Storage-level write
    /// conflicts are retried.
    pub async fn update(
        &self,
        id: &str,
        changes: TicketChanges,
        updated_by: &str,
        now: i64,
    ) -> RepoResult<Ticket> {
        let mut sets = vec!["last_updated_by = $updated_by", "updated_at = $now"];
        if changes.title.is_some() {
            sets.push("title = $title");
        }
        if changes.description.is_some() {
            sets.push("description = $description");
        }
        if changes.category.is_some() {
            sets.push("category = $category");
        }
        if changes.priority.is_some() {
            sets.push("priority = $priority");
        }
        if changes.status.is_some() {
            sets.push("status = $status");
        }
        match changes.resolution_date {
            Some(Some(_)) => sets.push("resolution_date = $resolution_date"),
            Some(None) => sets.push("resolution_date = NONE"),
            None => {}
        }

        let sql = format!(
            "UPDATE type::thing('ticket', $id) SET {} RETURN NONE",
            sets.join(", ")
        );
        let (sql, changes) = (&sql, &changes);
        retry_on_conflict("ticket_update", move || {
            self.try_update(id, sql, changes, updated_by, now)
        })
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Ticket {} not found", id)))
    }

    /// Append one response to the thread
    ///
    /// A single `+=` statement, so concurrent appends never overwrite each
    /// other. Write conflicts from the storage engine are retried.
    pub async fn append_response(
        &self,
        id: &str,
        user: &str,
        message: &str,
        now: i64,
    ) -> RepoResult<Ticket> {
        retry_on_conflict("response_append", move || {
            self.try_append(id, user, message, now)
        })
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Ticket {} not found", id)))
    }

    async fn try_update(
        &self,
        id: &str,
        sql: &str,
        changes: &TicketChanges,
        updated_by: &str,
        now: i64,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(sql)
            .bind(("id", id.to_string()))
            .bind(("updated_by", updated_by.to_string()))
            .bind(("now", now))
            .bind(("title", changes.title.clone()))
            .bind(("description", changes.description.clone()))
            .bind(("category", changes.category.map(|c| c.as_str())))
            .bind(("priority", changes.priority.map(|p| p.as_str())))
            .bind(("status", changes.status.map(|s| s.as_str())))
            .bind(("resolution_date", changes.resolution_date.flatten()))
            .await?
            .check()?;
        Ok(())
    }

    async fn try_append(&self, id: &str, user: &str, message: &str, now: i64) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"UPDATE type::thing('ticket', $id) SET
                    responses += { user: $user, message: $message, created_at: $now },
                    last_updated_by = $user,
                    updated_at = $now
                RETURN NONE"#,
            )
            .bind(("id", id.to_string()))
            .bind(("user", user.to_string()))
            .bind(("message", message.to_string()))
            .bind(("now", now))
            .await?
            .check()?;
        Ok(())
    }

    /// Hard delete
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE type::thing('ticket', $id)")
            .bind(("id", id.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}
