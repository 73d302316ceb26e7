//! Resource keys
//!
//! A [`ResourceKey`] names exactly one override document: the environment it
//! applies to plus the resource's type and name.

use crate::error::{OverrideError, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Identifiers become path components in the file store, so they are limited
/// to a conservative character set and may not start with a dot.
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.-]*$";

/// (environment, resource type, resource name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKey {
    environment: String,
    resource_type: String,
    resource_name: String,
}

impl ResourceKey {
    /// Create a key, validating every component
    ///
    /// # Errors
    ///
    /// Returns an invalid key error if any component is empty, starts with a
    /// character other than a letter or digit, or contains characters outside
    /// `[A-Za-z0-9_.-]`.
    #[inline]
    pub fn new<E, T, N>(environment: E, resource_type: T, resource_name: N) -> Result<Self>
    where
        E: Into<String>,
        T: Into<String>,
        N: Into<String>,
    {
        let key = Self {
            environment: environment.into(),
            resource_type: resource_type.into(),
            resource_name: resource_name.into(),
        };

        validate_identifier("environment", &key.environment)?;
        validate_identifier("resource type", &key.resource_type)?;
        validate_identifier("resource name", &key.resource_name)?;

        Ok(key)
    }

    /// Environment the override applies to
    #[must_use]
    #[inline]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Resource type (e.g. `service`, `ingress`, `postgres`)
    #[must_use]
    #[inline]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Resource name within the project
    #[must_use]
    #[inline]
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }
}

impl fmt::Display for ResourceKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.environment, self.resource_type, self.resource_name
        )
    }
}

/// Check that `value` is usable as a single path component
///
/// # Errors
///
/// Returns an invalid key error naming `label` when the value does not match
/// the identifier rules.
pub(crate) fn validate_identifier(label: &str, value: &str) -> Result<()> {
    let identifier =
        Regex::new(IDENTIFIER_PATTERN).map_err(|e| OverrideError::invalid_key(e.to_string()))?;

    if identifier.is_match(value) {
        Ok(())
    } else {
        Err(OverrideError::invalid_key(format!(
            "Invalid {label} '{value}': use letters, digits, '_', '-' or '.', starting with a letter or digit"
        )))
    }
}
