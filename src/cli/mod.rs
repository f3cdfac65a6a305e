//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod inspect;
mod resolve;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use crate::build::{BuildContext, PlanFormat};
use crate::config::loader::{load_project, merge_cli_overrides, CliOverrides, ConfigError};
use crate::env::Environment;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;

/// bundleplan - resolve multi-target bundler build plans
#[derive(Parser)]
#[command(name = "bundleplan")]
#[command(about = "Resolve per-component bundler build plans from bundle.toml")]
#[command(version)]
pub struct Cli {
    /// Path to bundle.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve build plans and print them for the bundler
    Resolve {
        /// Environment (default: read from the configured variable, NODE_ENV)
        #[arg(long, value_enum)]
        env: Option<Environment>,

        /// Only resolve this target (repeatable)
        #[arg(short, long = "target")]
        targets: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: PlanFormat,

        /// Write plans to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the source directory
        #[arg(long)]
        src: Option<PathBuf>,

        /// Skip checking that entry and alias files exist
        #[arg(long)]
        no_check: bool,
    },

    /// Resolve and verify every target without emitting plans
    Check {
        /// Environment (default: read from the configured variable, NODE_ENV)
        #[arg(long, value_enum)]
        env: Option<Environment>,

        /// Only check this target (repeatable)
        #[arg(short, long = "target")]
        targets: Vec<String>,

        /// Override the source directory
        #[arg(long)]
        src: Option<PathBuf>,
    },

    /// List the configured targets
    Targets,
}

/// Load configuration and build the context for a command.
///
/// With an explicit path the file must exist; otherwise the nearest
/// bundle.toml is used, falling back to the built-in catalog rooted at the
/// current directory.
pub(crate) fn load_context(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<BuildContext, ConfigError> {
    let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
    let (mut config, project_root) = load_project(config_path, &cwd)?;
    debug!(root = %project_root.display(), "loaded project");

    merge_cli_overrides(&mut config, overrides);
    Ok(BuildContext::new(config, project_root))
}

/// Pick the environment: CLI override first, then the configured variable.
pub(crate) fn environment_for(ctx: &BuildContext, overrides: &CliOverrides) -> Environment {
    overrides
        .environment
        .unwrap_or_else(|| Environment::from_env(&ctx.config().environment.variable))
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Resolve { env, targets, format, output, src, no_check } => {
            let overrides = CliOverrides { src, environment: env };
            resolve::run_resolve(config, &overrides, &targets, format, output.as_deref(), !no_check)
        }
        Commands::Check { env, targets, src } => {
            let overrides = CliOverrides { src, environment: env };
            inspect::run_check(config, &overrides, &targets)
        }
        Commands::Targets => inspect::run_targets(config),
    }
}
