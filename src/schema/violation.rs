//! A single schema non-conformance

use crate::value::PropertyPath;
use serde::Serialize;
use std::fmt;

/// A schema non-conformance at a specific property path
///
/// Serializes as `{"path": "spec.replicas", "message": "..."}`; the document
/// root is the empty path. The path string is for display: it is not read
/// back, since keys that are all digits or contain `.` would parse to
/// different segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Violation {
    /// Where the violation occurred
    pub path: PropertyPath,

    /// Human-readable reason
    pub message: String,
}

impl Violation {
    /// Create a violation at `path`
    #[inline]
    pub fn new<S: Into<String>>(path: PropertyPath, message: S) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}
