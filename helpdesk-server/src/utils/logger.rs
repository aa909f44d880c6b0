//! Logging Infrastructure
//!
//! Structured logging setup for development and production.
//! Targets in use: `http_access` (one line per request), `security`
//! (authentication and authorization failures).

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger (info, text, stdout)
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON format and file output
///
/// `RUST_LOG` overrides `log_level` when set. Calling this twice is harmless.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    // Add file output if log_dir exists
    if let Some(dir) = log_dir
        && Path::new(dir).is_dir()
    {
        let file_appender = tracing_appender::rolling::daily(dir, "helpdesk-server");
        let builder = builder.with_writer(file_appender).with_ansi(false);
        let _ = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        return;
    }

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
