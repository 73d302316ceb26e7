//! # `EnvOverride`
//!
//! `EnvOverride` is a command-line tool for customizing a project's resource
//! configurations per deployment environment. Overrides are sparse documents
//! merged over the base configuration; every change is checked against the
//! resource's module schema before it is stored.
//!
//! ## Usage
//!
//! ```sh
//! envoverride --env staging get service api
//! envoverride --env staging set service api spec.replicas 10
//! envoverride --env staging set service api spec.replicas ten --dry-run
//! envoverride --env staging unset service api spec.replicas
//! envoverride --env staging check service api
//! envoverride --env staging schema service api
//! ```
//!
//! Settings are read from `./envoverride.yaml` (`--config` to change):
//!
//! ```yaml
//! projectDir: ./project
//! stateDir: ./.envoverride
//! ```
//!
//! See `envoverride --help` for more options and details.

use anyhow::Result;
use clap::Parser as _;
use envoverride::cli::Args;
use envoverride::error::OverrideError;
use envoverride::system::real::RealSystem;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber based on verbose flag
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Results go to stdout, so logs go to stderr
    fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let system = RealSystem::new();
    match envoverride::run(&args, &system) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<OverrideError>()
                    .map_or(1, OverrideError::exit_code),
            );
        }
    }
}
