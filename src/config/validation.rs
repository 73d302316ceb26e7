//! Settings validation logic

use crate::config::Settings;
use crate::error::OverrideError;
use crate::system::System;
use anyhow::Result;

/// Validate loaded settings against the filesystem
///
/// # Errors
///
/// Returns an error if:
/// - The project directory does not exist
/// - The state directory exists but is not a directory
#[inline]
pub fn validate_settings(system: &dyn System, settings: &Settings) -> Result<()> {
    if !system.is_dir(&settings.project_dir) {
        return Err(OverrideError::configuration(format!(
            "Project directory not found: {}",
            settings.project_dir.display()
        ))
        .into());
    }

    if system.exists(&settings.state_dir) && !system.is_dir(&settings.state_dir) {
        return Err(OverrideError::configuration(format!(
            "State directory path is not a directory: {}",
            settings.state_dir.display()
        ))
        .into());
    }

    Ok(())
}
