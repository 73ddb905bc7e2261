//! Error types for state validation and file-backed sources

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when a value is rejected or a file source cannot be read
#[derive(Debug, Error)]
pub enum StateError {
    /// A record failed shape validation
    #[error("invalid shape for '{field}': {reason}")]
    InvalidShape {
        /// Field that failed validation
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Requested theme does not exist in the library
    #[error("theme not found: {0}")]
    ThemeNotFound(String),

    /// Failed to read a file or directory
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to render a dialog template
    #[error("failed to render template: {0}")]
    Template(#[from] handlebars::RenderError),
}

impl StateError {
    /// Create an invalid shape error
    pub fn invalid_shape(field: &'static str, reason: impl Into<String>) -> Self {
        StateError::InvalidShape {
            field,
            reason: reason.into(),
        }
    }

    /// Create an I/O error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StateError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Shape validation for records held in a store
pub trait Validate {
    /// Check the record, returning `InvalidShape` on the first bad field
    fn validate(&self) -> Result<(), StateError>;
}
