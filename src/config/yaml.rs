//! YAML settings loading and parsing

use crate::config::{DEFAULT_STATE_DIR, Settings, SettingsOverrides};
use crate::error::OverrideError;
use crate::system::System;
use crate::value::merge_layers;
use anyhow::{Context as _, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Settings keys holding filesystem paths
const PATH_KEYS: &[&str] = &["projectDir", "stateDir"];

/// Load settings from `path`, merge command-line overrides and validate them
///
/// Relative paths in the file (including the default state directory)
/// resolve against the file's directory; relative
/// paths on the command line stay relative to the working directory. The
/// file may be absent when the overrides name a project directory.
pub fn load_settings(
    system: &dyn System,
    path: &str,
    overrides: &SettingsOverrides,
) -> Result<Settings> {
    let path_obj = Path::new(path);

    let file_layer = if system.is_file(path_obj) {
        let content = system
            .read_to_string(path_obj)
            .with_context(|| format!("Failed to read settings file: {path}"))?;

        let mut layer: Value = serde_yaml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse YAML settings in file: {path}\n\
                Please check the syntax and structure of your settings file"
            )
        })?;

        if let Some(map) = layer.as_object_mut()
            && !map.contains_key("stateDir")
        {
            map.insert(
                "stateDir".to_owned(),
                Value::String(DEFAULT_STATE_DIR.to_owned()),
            );
        }
        if let Some(base_dir) = path_obj.parent() {
            resolve_relative_paths(&mut layer, base_dir);
        }
        layer
    } else if overrides.project_dir.is_some() {
        debug!("No settings file at {path}; using command-line settings");
        Value::Object(Map::new())
    } else {
        return Err(OverrideError::configuration(format!(
            "Settings file not found: {path}\n\
            Create an envoverride.yaml file or pass --project-dir"
        ))
        .into());
    };

    let merged = merge_layers([file_layer, override_layer(overrides)]);

    // Validate against JSON schema
    crate::config::schema::validate_against_schema(&merged)
        .context("Settings validation failed")?;

    let settings: Settings =
        serde_json::from_value(merged).context("Failed to decode validated settings")?;

    // Validate settings logic (directories exist, etc.)
    settings.validate(system).context("Settings validation failed")?;

    Ok(settings)
}

fn override_layer(overrides: &SettingsOverrides) -> Value {
    let mut layer = Map::new();
    if let Some(project_dir) = overrides.project_dir.as_ref() {
        layer.insert(
            "projectDir".to_owned(),
            Value::String(project_dir.to_string_lossy().into_owned()),
        );
    }
    if let Some(state_dir) = overrides.state_dir.as_ref() {
        layer.insert(
            "stateDir".to_owned(),
            Value::String(state_dir.to_string_lossy().into_owned()),
        );
    }
    Value::Object(layer)
}

fn resolve_relative_paths(layer: &mut Value, base_dir: &Path) {
    if base_dir.as_os_str().is_empty() {
        return;
    }

    let Some(map) = layer.as_object_mut() else {
        return;
    };

    for key in PATH_KEYS {
        if let Some(Value::String(raw)) = map.get_mut(*key)
            && Path::new(raw.as_str()).is_relative()
        {
            *raw = base_dir.join(raw.as_str()).to_string_lossy().into_owned();
        }
    }
}
