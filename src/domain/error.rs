//! Domain-level error types for crosh.
//!
//! All errors are typed with `thiserror` and carry enough context
//! (operation and path) to diagnose a failure without a backtrace.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// The user's home directory could not be resolved.
    #[error("Could not determine home directory")]
    HomeNotFound,

    /// A tool configuration file exists but is not valid JSON.
    #[error("Failed to parse {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Invalid user input or preference value.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a JSON parse error for the given file.
    pub fn json_parse(path: impl Into<PathBuf>, err: serde_json::Error) -> Self {
        Self::JsonParse {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_context() {
        let err = AppError::io(
            "Failed to write /tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "IO error: Failed to write /tmp/x");
        assert!(std::error::Error::source(&err).is_some());
    }
}
