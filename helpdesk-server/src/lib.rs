//! Help-desk server
//!
//! # Overview
//!
//! End users file support tickets, administrators triage and resolve them,
//! and both sides exchange threaded responses. Every ticket read carries a
//! derived SLA state computed from its deadline and status.
//!
//! # Layout
//!
//! ```text
//! helpdesk-server/src/
//! ├── core/          # config, state, server, startup errors
//! ├── auth/          # JWT tokens, authorization gate, identity operations
//! ├── db/            # embedded SurrealDB, records, repositories
//! ├── tickets/       # lifecycle engine, SLA derivation, metrics
//! ├── attachments.rs # uploaded file storage
//! ├── services/      # router assembly, CORS, access log
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging, validation, time parsing
//! ```

pub mod api;
pub mod attachments;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod tickets;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use tickets::{MetricsReporter, TicketService};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro (target "security")
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(
            target: "security",
            level = %$level,
            event = %$event,
            $($key = %$value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
  _  _     _        ___          _
 | || |___| |_ __  |   \ ___ ___| |__
 | __ / -_) | '_ \ | |) / -_|_-<| / /
 |_||_\___|_| .__/ |___/\___/__/|_\_\
            |_|
    "#
    );
}
