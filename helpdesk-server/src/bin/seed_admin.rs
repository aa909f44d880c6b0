//! Provision the first administrator account
//!
//! Reads `WORK_DIR`, `ADMIN_NAME`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`.
//! Does nothing when an admin already exists.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use helpdesk_server::auth::identity::SeedOutcome;
use helpdesk_server::auth::{IdentityService, JwtConfig, JwtService};
use helpdesk_server::db::DbService;
use helpdesk_server::db::repository::UserRepository;
use helpdesk_server::{Config, init_logger};

const DEFAULT_ADMIN_NAME: &str = "System Admin";
const DEFAULT_ADMIN_EMAIL: &str = "admin@company.com";
const DEFAULT_ADMIN_PASSWORD: &str = "sample123";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

async fn run() -> anyhow::Result<SeedOutcome> {
    let work_dir = env_or("WORK_DIR", "./data");
    let db_path = Config::database_path_for(Path::new(&work_dir));
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let service = DbService::new(&db_path).await?;
    let jwt = JwtConfig::from_env(true)?;
    let identity = IdentityService::new(
        UserRepository::new(service.db.clone()),
        Arc::new(JwtService::with_config(jwt)),
    );

    let outcome = identity
        .seed_admin(
            &env_or("ADMIN_NAME", DEFAULT_ADMIN_NAME),
            &env_or("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            &env_or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
        )
        .await?;
    Ok(outcome)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_logger();

    match run().await {
        Ok(SeedOutcome::Created(id)) => {
            tracing::info!(user_id = %id, "Admin user created");
            ExitCode::SUCCESS
        }
        Ok(SeedOutcome::AdminExists) => {
            tracing::info!("Admin user already exists, skipping");
            ExitCode::SUCCESS
        }
        Ok(SeedOutcome::EmailTaken) => {
            tracing::warn!("Admin email is already registered, skipping");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Seeding failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
