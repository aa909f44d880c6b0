use std::path::{Path, PathBuf};

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};

/// Default per-attachment size limit (5 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | database and uploads root |
/// | HTTP_PORT | 5000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | JWT_SECRET | generated in development | token signing secret (>= 32 chars) |
/// | JWT_EXPIRATION_DAYS | 15 | token lifetime |
/// | JWT_ISSUER / JWT_AUDIENCE | helpdesk-server / helpdesk-clients | token claims |
/// | FRONTEND_URL | - | allowed CORS origin |
/// | CORS_ORIGINS | - | comma separated extra CORS origins |
/// | LOG_LEVEL | info | tracing filter (RUST_LOG wins when set) |
/// | LOG_FORMAT | text | `json` for structured output |
/// | LOG_DIR | - | daily rolling log files when the directory exists |
/// | MAX_UPLOAD_BYTES | 5242880 | per-attachment size limit |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/helpdesk HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding `database/` and `uploads/`
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    /// JWT settings, handed to the token service at startup
    pub jwt: JwtConfig,
    /// CORS allow-list (empty = permissive in development)
    pub cors_origins: Vec<String>,
    /// Per-attachment size limit in bytes
    pub max_upload_bytes: usize,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset variables fall back to defaults. Outside development a
    /// `JWT_SECRET` is mandatory.
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let jwt = JwtConfig::from_env(environment == "development")?;

        let mut cors_origins: Vec<String> = Vec::new();
        if let Ok(url) = std::env::var("FRONTEND_URL") {
            cors_origins.push(url);
        }
        if let Ok(list) = std::env::var("CORS_ORIGINS") {
            cors_origins.extend(list.split(',').map(str::to_string));
        }
        let cors_origins = normalize_origins(cors_origins);

        let http_port = match std::env::var("HTTP_PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| ServerError::Config(format!("Invalid HTTP_PORT: {}", p)))?,
            Err(_) => 5000,
        };

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port,
            environment,
            jwt,
            cors_origins,
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok(),
        })
    }

    /// Development configuration rooted at `work_dir` with an explicit JWT config
    ///
    /// Reads nothing from the environment; used by tests and tools.
    pub fn with_work_dir(work_dir: impl Into<String>, jwt: JwtConfig) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 5000,
            environment: "development".into(),
            jwt,
            cors_origins: Vec::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
        }
    }

    /// Database file: `{work_dir}/database/helpdesk.db`
    pub fn database_path(&self) -> PathBuf {
        Self::database_path_for(Path::new(&self.work_dir))
    }

    pub fn database_path_for(work_dir: &Path) -> PathBuf {
        work_dir.join("database").join("helpdesk.db")
    }

    /// Attachment directory: `{work_dir}/uploads`
    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    /// Create `database/` and `uploads/` under the work directory
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(PathBuf::from(&self.work_dir).join("database"))?;
        std::fs::create_dir_all(self.uploads_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Trim, drop empties and trailing slashes, de-duplicate
fn normalize_origins(origins: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for origin in origins {
        let origin = origin.trim().trim_end_matches('/').to_string();
        if !origin.is_empty() && !out.contains(&origin) {
            out.push(origin);
        }
    }
    out
}
