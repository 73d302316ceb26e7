use crate::config::DEFAULT_SETTINGS_FILE;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// Command-line arguments for envoverride
#[derive(Parser, Debug, Clone)]
#[command(name = "envoverride")]
#[command(about = "Manage per-environment configuration overrides for deployable resources")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Settings file path
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_FILE, global = true)]
    pub config: String,

    /// Project directory with base configurations and schemas (overrides the settings file)
    #[arg(long, value_name = "DIR", global = true)]
    pub project_dir: Option<PathBuf>,

    /// Directory holding override documents (overrides the settings file)
    #[arg(long, value_name = "DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Environment whose overrides are read or changed
    #[arg(long = "env", value_name = "ENV", env = "ENVOVERRIDE_ENV", global = true)]
    pub environment: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Override operations
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the base, override and effective configuration of a resource
    Get(ResourceArgs),

    /// Override one property; the result must satisfy the resource schema
    Set {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Dot-separated property path, e.g. spec.resources.limits.cpu
        path: String,

        /// New value, parsed as YAML (10 is a number, ten a string, {cpu: 1} an object)
        value: String,

        /// Preview the change and its schema violations without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove one property override, pruning emptied parents
    Unset {
        #[command(flatten)]
        resource: ResourceArgs,

        /// Dot-separated property path
        path: String,
    },

    /// Replace the whole override document with the contents of a YAML or JSON file
    Replace {
        #[command(flatten)]
        resource: ResourceArgs,

        /// File holding the new override document
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },

    /// Remove every override of a resource
    Clear(ResourceArgs),

    /// Validate the current effective configuration against the resource schema
    Check(ResourceArgs),

    /// Show the module schema that overrides of a resource must satisfy
    Schema(ResourceArgs),

    /// List resources that carry overrides in the environment
    List,
}

/// Identifies a resource within the project
#[derive(clap::Args, Debug, Clone)]
pub struct ResourceArgs {
    /// Resource type (e.g. service, ingress, postgres)
    pub resource_type: String,

    /// Resource name
    pub resource_name: String,
}

/// Parse a command-line value as YAML, which also accepts any JSON value
///
/// # Errors
///
/// Returns an error if the text is not valid YAML.
#[inline]
pub fn parse_value(raw: &str) -> anyhow::Result<Value> {
    serde_yaml::from_str(raw).map_err(|e| anyhow::anyhow!("Invalid value '{raw}': {e}"))
}
