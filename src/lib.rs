//! `EnvOverride` - per-environment configuration overrides for deployable resources
//!
//! A resource's base configuration is authored once per project. Each
//! deployment environment may customize it with a sparse override document;
//! the effective configuration is `merge(base, override)` and must satisfy the
//! resource's schema before an override is stored.
//!
//! The engine is built from small pieces:
//! - [`value`]: dot-notation property paths and the override merge
//! - [`schema`]: validation that reports violations as data
//! - [`store`]: whole-document, revision-checked override persistence
//! - [`provider`]: sources of base configurations and schemas
//! - [`service`]: the override operations tying them together

pub mod cli;
pub mod config;
pub mod error;
pub mod key;
pub mod provider;
pub mod schema;
pub mod service;
pub mod store;
pub mod system;
pub mod value;

pub use error::{OverrideError, Result};
pub use key::ResourceKey;

use cli::Args;
use system::System;

/// Main entry point for the envoverride command line
///
/// Prints the command's JSON result to stdout. A `check` that finds
/// violations prints its report and then fails with a validation error.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn run(args: &Args, system: &dyn System) -> anyhow::Result<()> {
    let output = cli::execute(args, system)?;

    // Output to stdout (not using logging)
    println!("{}", serde_json::to_string_pretty(&output.document)?);

    if output.violations.is_empty() {
        Ok(())
    } else {
        Err(OverrideError::validation(output.violations).into())
    }
}
