//! Repository Module
//!
//! CRUD operations over the SurrealDB tables.

pub mod ticket;
pub mod user;

// Re-exports
pub use ticket::TicketRepository;
pub use user::UserRepository;

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        // Unique index violation
        if message.contains("already contains") {
            RepoError::Duplicate(message)
        } else {
            RepoError::Database(message)
        }
    }
}

impl RepoError {
    /// Optimistic transaction conflict reported by the storage engine
    pub fn is_retryable(&self) -> bool {
        match self {
            RepoError::Database(message) => {
                let message = message.to_lowercase();
                message.contains("can be retried")
                    || message.contains("conflict")
                    || message.contains("resource busy")
            }
            _ => false,
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

const CONFLICT_MAX_ATTEMPTS: u32 = 20;

/// Run a write, re-running it while the engine reports a transaction conflict
///
/// Each attempt must rebuild its query from scratch; the closure is called
/// once per attempt. Non-conflict errors and the last conflict are returned.
pub async fn retry_on_conflict<T, F, Fut>(op: &str, mut attempt_write: F) -> RepoResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RepoResult<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match attempt_write().await {
            Err(e) if e.is_retryable() && attempt < CONFLICT_MAX_ATTEMPTS => {
                tracing::debug!(op, attempt, error = %e, "Write conflicted, retrying");
                tokio::time::sleep(Duration::from_millis(2 * u64::from(attempt))).await;
            }
            other => return other,
        }
    }
}

// =============================================================================
// ID convention
// =============================================================================
//
// Keys are server generated (`Uuid::new_v4().simple()`) and always strings.
//   - create: CREATE type::thing('ticket', $key) CONTENT { ... }
//   - read:   SELECT record::id(id) AS id, ... FROM type::thing('ticket', $id)
//   - batch:  SELECT ... FROM $things  (Vec<RecordId>)
// The API only ever sees the bare key.

/// Fresh record key
pub fn new_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
