//! CLI command implementations

use crate::cli::{Args, Command, ResourceArgs, parse_value};
use crate::config::{Settings, SettingsOverrides};
use crate::error::OverrideError;
use crate::key::ResourceKey;
use crate::provider::FileConfigProvider;
use crate::schema::Violation;
use crate::service::OverrideService;
use crate::store::FileOverrideStore;
use crate::system::System;
use anyhow::{Context as _, Result};
use serde_json::{Value, json};
use std::path::Path;

/// What a command prints, plus the violations that make `check` fail
#[derive(Debug)]
#[non_exhaustive]
pub struct CommandOutput {
    /// JSON document written to stdout
    pub document: Value,

    /// Violations reported by `check`; non-empty means the command failed
    pub violations: Vec<Violation>,
}

impl CommandOutput {
    const fn document(document: Value) -> Self {
        Self {
            document,
            violations: Vec::new(),
        }
    }
}

/// Execute the command selected in `args`
///
/// # Errors
///
/// Returns an error if:
/// - The settings cannot be loaded
/// - No environment is selected
/// - The override operation fails
#[inline]
pub fn execute(args: &Args, system: &dyn System) -> Result<CommandOutput> {
    let overrides = SettingsOverrides::new(args.project_dir.clone(), args.state_dir.clone());
    let settings = Settings::load(system, &args.config, &overrides)?;
    let environment = args.environment.as_deref().ok_or_else(|| {
        OverrideError::configuration(
            "No environment selected. Pass --env <ENV> or set ENVOVERRIDE_ENV",
        )
    })?;

    let provider = FileConfigProvider::new(system, settings.project_dir.clone());
    let store = FileOverrideStore::new(system, settings.state_dir.clone());
    let service = OverrideService::new(&provider, &store);

    let key_for = |resource: &ResourceArgs| {
        ResourceKey::new(
            environment,
            resource.resource_type.as_str(),
            resource.resource_name.as_str(),
        )
    };

    let output = match &args.command {
        Command::Get(resource) => {
            let view = service.get_effective(&key_for(resource)?)?;
            CommandOutput::document(serde_json::to_value(view)?)
        }
        Command::Set {
            resource,
            path,
            value,
            dry_run,
        } => {
            let key = key_for(resource)?;
            let value = parse_value(value)?;
            if *dry_run {
                let preview = service.preview_set(&key, path, value)?;
                CommandOutput::document(serde_json::to_value(preview)?)
            } else {
                let document = service.apply_set(&key, path, value)?;
                CommandOutput::document(json!({"key": key, "override": document}))
            }
        }
        Command::Unset { resource, path } => {
            let key = key_for(resource)?;
            let document = service.remove_property(&key, path)?;
            CommandOutput::document(json!({"key": key, "override": document}))
        }
        Command::Replace { resource, file } => {
            let key = key_for(resource)?;
            let document = read_document(system, file)?;
            let document = service.replace_all(&key, document)?;
            CommandOutput::document(json!({"key": key, "override": document}))
        }
        Command::Clear(resource) => {
            let key = key_for(resource)?;
            let document = service.clear_all(&key)?;
            CommandOutput::document(json!({"key": key, "override": document}))
        }
        Command::Check(resource) => {
            let key = key_for(resource)?;
            let violations = service.check(&key)?;
            CommandOutput {
                document: json!({
                    "key": key,
                    "valid": violations.is_empty(),
                    "violations": violations,
                }),
                violations,
            }
        }
        Command::Schema(resource) => {
            let key = key_for(resource)?;
            let schema = service.schema(&key)?;
            CommandOutput::document(json!({"key": key, "schema": schema}))
        }
        Command::List => {
            let keys = service.list_overrides(environment)?;
            CommandOutput::document(json!({"environment": environment, "resources": keys}))
        }
    };

    Ok(output)
}

/// Read an override document from a YAML or JSON file
fn read_document(system: &dyn System, path: &Path) -> Result<Value> {
    let content = system
        .read_to_string(path)
        .with_context(|| format!("Failed to read override document: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse override document: {}", path.display()))
}
