//! Logging infrastructure for the service desk monitor.
//!
//! Structured logging using the `tracing` ecosystem. The dashboard owns the
//! terminal, so the log file is the primary sink; stderr output only shows
//! up before the TUI starts and after it exits.
//!
//! ## Features
//!
//! - JSON lines format for machine parsing
//! - File output to `~/.servicedesk/logs/servicedesk.log` (daily rolling)
//! - Console output with configurable verbosity
//! - `RUST_LOG` overrides the default filter
//!
//! ## Example
//!
//! ```no_run
//! use desk_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!("dashboard started");
//! tracing::debug!(unassigned = 3, "alert state changed");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{DeskError, Result};

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "servicedesk.log";

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system.
///
/// This sets up:
/// - File logging to `~/.servicedesk/logs/servicedesk.log` (JSON lines)
/// - Console logging to stderr (human-readable)
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.servicedesk/logs/`
/// * `verbose` - If true, sets log level to DEBUG. Otherwise uses INFO.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| DeskError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "servicedesk={default_level},desk_core={default_level},desk_tui={default_level}"
        ))
    });

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    // Warnings and above only: anything chattier would scribble over the TUI.
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the base directory for monitor state.
///
/// Returns `~/.servicedesk/`
pub fn default_base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| DeskError::internal("home directory could not be determined"))?;

    Ok(home.join(".servicedesk"))
}

/// Get the default log directory path.
///
/// Returns `~/.servicedesk/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(default_base_dir()?.join("logs"))
}

/// Log an alert scheduler transition or chime.
///
/// # Example
///
/// ```ignore
/// log_alert_event!("chime");
/// log_alert_event!("armed", unassigned = 4, sound = true);
/// ```
#[macro_export]
macro_rules! log_alert_event {
    ($event:expr) => {
        tracing::info!(
            target: "desk_core::alert",
            event = $event,
            "alert event"
        )
    };
    ($event:expr, $($field:tt)*) => {
        tracing::info!(
            target: "desk_core::alert",
            event = $event,
            $($field)*,
            "alert event"
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_log_dir() {
        // SAFETY: serialized with every other test that touches HOME
        unsafe { std::env::set_var("HOME", "/tmp/test-home") };
        let dir = default_log_dir().unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/test-home/.servicedesk/logs"));
    }

    #[test]
    fn test_init_test_logging() {
        init_test_logging();
        init_test_logging();
    }
}
