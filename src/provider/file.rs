//! Project directory configuration provider
//!
//! Layout under the project directory:
//!
//! ```text
//! <type>/<name>.json                       base configuration
//! schemas/<type>/<flavor>/<version>.json   module schema
//! ```
//!
//! A resource selects its module schema through the top-level `flavor` and
//! `version` strings of its base configuration.

use super::ConfigProvider;
use crate::error::{OverrideError, Result};
use crate::key::{ResourceKey, validate_identifier};
use crate::system::System;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads base configurations and schemas from a project directory
pub struct FileConfigProvider<'sys> {
    system: &'sys dyn System,
    project_dir: PathBuf,
}

impl<'sys> FileConfigProvider<'sys> {
    /// Create a provider reading from `project_dir`
    #[inline]
    pub fn new<P: Into<PathBuf>>(system: &'sys dyn System, project_dir: P) -> Self {
        Self {
            system,
            project_dir: project_dir.into(),
        }
    }

    /// The project directory this provider reads from
    #[must_use]
    #[inline]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn read_json(&self, path: &Path) -> Result<Value> {
        let content = self.system.read_to_string(path).map_err(|e| {
            OverrideError::storage(format!("Failed to read {}: {e}", path.display()))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            OverrideError::storage(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    fn module_field<'v>(base: &'v Value, field: &str, key: &ResourceKey) -> Result<&'v str> {
        let value = base.get(field).and_then(Value::as_str).ok_or_else(|| {
            OverrideError::not_found(format!(
                "No module schema registered for resource '{}' of type '{}': it does not declare a {field}",
                key.resource_name(),
                key.resource_type()
            ))
        })?;
        validate_identifier(field, value)?;
        Ok(value)
    }
}

impl ConfigProvider for FileConfigProvider<'_> {
    #[inline]
    fn fetch_base(&self, key: &ResourceKey) -> Result<Value> {
        let path = self
            .project_dir
            .join(key.resource_type())
            .join(format!("{}.json", key.resource_name()));

        if !self.system.is_file(&path) {
            return Err(OverrideError::not_found(format!(
                "Resource '{}' of type '{}' does not exist in project {}",
                key.resource_name(),
                key.resource_type(),
                self.project_dir.display()
            )));
        }

        debug!("Reading base configuration for {key} from {}", path.display());
        self.read_json(&path)
    }

    #[inline]
    fn fetch_schema(&self, key: &ResourceKey) -> Result<Value> {
        let base = self.fetch_base(key)?;
        let flavor = Self::module_field(&base, "flavor", key)?;
        let version = Self::module_field(&base, "version", key)?;

        let path = self
            .project_dir
            .join("schemas")
            .join(key.resource_type())
            .join(flavor)
            .join(format!("{version}.json"));

        if !self.system.is_file(&path) {
            return Err(OverrideError::not_found(format!(
                "No module schema registered for type '{}', flavor '{flavor}', version '{version}'",
                key.resource_type()
            )));
        }

        debug!("Reading module schema for {key} from {}", path.display());
        self.read_json(&path)
    }
}
