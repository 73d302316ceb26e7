//! Workspace settings module
//!
//! Handles YAML settings parsing, schema validation, and merging of
//! command-line overrides

pub mod schema;
pub mod validation;
pub mod yaml;

use crate::system::System;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default settings file name
pub const DEFAULT_SETTINGS_FILE: &str = "./envoverride.yaml";

/// State directory used when the settings do not name one
pub const DEFAULT_STATE_DIR: &str = ".envoverride";

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Settings {
    /// Project directory holding base configurations and module schemas
    pub project_dir: PathBuf,

    /// Directory holding the per-environment override documents
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_DIR)
}

/// Settings given on the command line, taking precedence over the file
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct SettingsOverrides {
    pub project_dir: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
}

impl SettingsOverrides {
    /// Create overrides from optional command-line values
    #[must_use]
    #[inline]
    pub const fn new(project_dir: Option<PathBuf>, state_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            state_dir,
        }
    }
}

impl Settings {
    /// Load settings from file, apply overrides and validate the result
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file is missing and the overrides do not name a project directory
    /// - The file cannot be read or parsed
    /// - The merged settings fail schema or semantic validation
    #[inline]
    pub fn load(
        system: &dyn System,
        path: &str,
        overrides: &SettingsOverrides,
    ) -> anyhow::Result<Self> {
        yaml::load_settings(system, path, overrides)
    }

    /// Validate settings against the filesystem
    ///
    /// # Errors
    ///
    /// Returns an error if the project directory does not exist or the state
    /// directory path is not a directory.
    #[inline]
    pub fn validate(&self, system: &dyn System) -> anyhow::Result<()> {
        validation::validate_settings(system, self)
    }
}
