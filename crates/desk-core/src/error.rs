//! Error types for the service desk monitor.
//!
//! Ticket generation, alert scheduling and refresh are infallible. Errors
//! only come from the ambient parts of the program: reading configuration,
//! preparing the log directory, building the service client and setting up
//! the terminal.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`DeskError`].
pub type Result<T> = std::result::Result<T, DeskError>;

/// Error type for all fallible service desk operations.
#[derive(Debug, Error)]
pub enum DeskError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Service Client Errors
    // =========================================================================
    /// Endpoint URL could not be used
    #[error("Invalid service endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },

    /// HTTP client could not be built
    #[error("Failed to build service client: {message}")]
    ClientBuild {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    // =========================================================================
    // TUI Errors
    // =========================================================================
    /// Terminal initialization failed
    #[error("Terminal initialization failed: {message}")]
    TerminalInit { message: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DeskError {
    /// Create a ConfigNotFound error with source
    pub fn config_not_found_with_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: Some(source),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a TerminalInit error
    pub fn terminal_init(message: impl Into<String>) -> Self {
        Self::TerminalInit {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. } | Self::ConfigValidation { .. }
        )
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Pass an existing file with --config or remove the flag to use defaults")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in the configuration file"),
            Self::ConfigValidation { .. } => {
                Some("Intervals must be non-zero and min_batch must not exceed max_batch")
            }
            Self::InvalidEndpoint { .. } => Some("Service URLs must be absolute http(s) URLs"),
            Self::TerminalInit { .. } => Some("Try running in a different terminal"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_error() {
        let err = DeskError::config_not_found_with_source(
            "/home/user/.servicedesk/config.yaml",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(err.to_string().contains("Configuration not found"));
        assert!(err.is_config_error());
        assert!(err.guidance().is_some());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_error() {
        let err = DeskError::validation("refresh_interval_secs must be > 0");
        assert!(err.to_string().contains("refresh_interval_secs"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_error_classification() {
        assert!(!DeskError::internal("bug").is_config_error());
        assert!(DeskError::internal("bug").guidance().is_none());

        let err = DeskError::terminal_init("enabling raw mode: no tty");
        assert!(matches!(err, DeskError::TerminalInit { .. }));
        assert!(!err.is_config_error());
        assert_eq!(err.to_string(), "Terminal initialization failed: enabling raw mode: no tty");
        assert_eq!(err.guidance(), Some("Try running in a different terminal"));
    }

    #[test]
    fn test_endpoint_guidance() {
        let err = DeskError::InvalidEndpoint {
            url: "ftp://nope".into(),
            message: "unsupported scheme".into(),
        };
        assert_eq!(err.guidance(), Some("Service URLs must be absolute http(s) URLs"));
    }
}
