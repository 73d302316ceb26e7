//! Custom error types with exit codes

use crate::schema::Violation;
use thiserror::Error;

/// Result alias used across the override engine
pub type Result<T, E = OverrideError> = core::result::Result<T, E>;

/// Main error type for envoverride operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OverrideError {
    /// Configuration Error - missing or invalid settings or CLI input
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Path Error - malformed property path or traversal through an incompatible value
    #[error("Path error: {message}")]
    Path { message: String },

    /// Not Found Error - resource, base configuration or schema does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Validation Error - the would-be effective configuration violates the schema
    #[error("Validation failed with {} violation(s):\n{}", violations.len(), format_violations(violations))]
    Validation { violations: Vec<Violation> },

    /// Concurrency Error - the stored override changed since it was loaded
    #[error("Concurrency error: {message}")]
    Concurrency { message: String },

    /// Schema Error - the schema document itself is malformed
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// Invalid Key Error - a resource key component is not a safe identifier
    #[error("Invalid resource key: {message}")]
    InvalidKey { message: String },

    /// Storage Error - reading or writing a collaborator's backing data failed
    #[error("Storage error: {message}")]
    Storage { message: String },
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("  - {violation}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl OverrideError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } => 1,
            Self::Path { .. } => 2,
            Self::NotFound { .. } => 3,
            Self::Validation { .. } => 4,
            Self::Concurrency { .. } => 5,
            Self::Schema { .. } => 6,
            Self::InvalidKey { .. } => 7,
            Self::Storage { .. } => 8,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a path error
    #[inline]
    pub fn path<S: Into<String>>(message: S) -> Self {
        Self::Path {
            message: message.into(),
        }
    }

    /// Create a not-found error
    #[inline]
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a validation error carrying every violation found
    #[inline]
    #[must_use]
    pub const fn validation(violations: Vec<Violation>) -> Self {
        Self::Validation { violations }
    }

    /// Create a concurrency error
    #[inline]
    pub fn concurrency<S: Into<String>>(message: S) -> Self {
        Self::Concurrency {
            message: message.into(),
        }
    }

    /// Create a schema error
    #[inline]
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create an invalid key error
    #[inline]
    pub fn invalid_key<S: Into<String>>(message: S) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Create a storage error
    #[inline]
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Violations carried by a validation error, empty for every other kind
    #[must_use]
    #[inline]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Validation { violations } => violations,
            _ => &[],
        }
    }
}
