use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::attachments::AttachmentStore;
use crate::auth::{IdentityService, JwtService};
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::db::repository::{TicketRepository, UserRepository};
use crate::tickets::{MetricsReporter, TicketService};

/// Server state - shared by every handler
///
/// Cheap to clone: the database handle and token service are reference
/// counted. No ticket or user data is cached here; every request reads the
/// store.
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | immutable configuration |
/// | db | Surreal<Db> | embedded database |
/// | jwt_service | Arc<JwtService> | token issue / verify |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// Assemble state from already-initialized parts
    ///
    /// Usually [`initialize()`](Self::initialize) is used instead.
    pub fn new(config: Config, db: Surreal<Db>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            db,
            jwt_service,
        }
    }

    /// Initialize server state
    ///
    /// 1. work directory structure
    /// 2. database (`work_dir/database/helpdesk.db`) and schema
    /// 3. token service from the configured secret
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_service = DbService::new(&config.database_path()).await?;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(config.clone(), db_service.db, jwt_service))
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.get_db())
    }

    pub fn identity(&self) -> IdentityService {
        IdentityService::new(self.users(), self.get_jwt_service())
    }

    pub fn tickets(&self) -> TicketService {
        TicketService::new(TicketRepository::new(self.get_db()), self.users())
    }

    pub fn metrics(&self) -> MetricsReporter {
        MetricsReporter::new(TicketRepository::new(self.get_db()))
    }

    pub fn attachments(&self) -> AttachmentStore {
        AttachmentStore::new(self.config.uploads_dir(), self.config.max_upload_bytes)
    }
}
