//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) and schema bootstrap

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

/// Namespace and database name
pub const NAMESPACE: &str = "helpdesk";
pub const DATABASE: &str = "helpdesk";

/// Schema definitions, idempotent
///
/// The unique index makes the store itself reject a second account with the
/// same email, even when two registrations race.
const SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS user_email ON TABLE user FIELDS email UNIQUE;
    DEFINE TABLE IF NOT EXISTS ticket SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS ticket_owner ON TABLE ticket FIELDS owner;
"#;

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at `db_path` and apply the schema
    pub async fn new(db_path: &Path) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        let service = Self::from_connection(db).await?;
        tracing::info!(path = %db_path.display(), "Database ready (SurrealDB, RocksDB)");
        Ok(service)
    }

    /// Select namespace/database on an open connection and apply the schema
    pub async fn from_connection(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select database: {e}")))?;

        db.query(SCHEMA)
            .await
            .and_then(|response| response.check())
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;

        Ok(Self { db })
    }
}
