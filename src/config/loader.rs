//! Configuration loading and discovery for `bundle.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{
    default_aliases, BundleConfig, EnvironmentConfig, OutputConfig, ProjectConfig,
    ResolveConfig, StylesConfig, TargetConfig,
};
use crate::env::Environment;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "bundle.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// Working directory could not be determined
    #[error("Failed to read current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse bundle.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override source directory
    pub src: Option<PathBuf>,
    /// Force the environment instead of reading the variable
    pub environment: Option<Environment>,
}

/// Find bundle.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Pick the config file: an explicit path wins, otherwise the nearest
/// bundle.toml at or above `cwd`.
pub fn locate_config(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_from(cwd.to_path_buf()),
    }
}

/// Load a configuration and its project root.
///
/// Without a config file the built-in catalog is used, rooted at `cwd`.
pub fn load_project(
    explicit: Option<&Path>,
    cwd: &Path,
) -> Result<(BundleConfig, PathBuf), ConfigError> {
    match locate_config(explicit, cwd) {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, project_root(&path, cwd)))
        }
        None => {
            debug!("no {} found, using built-in catalog", CONFIG_FILE_NAME);
            Ok((default_config(), cwd.to_path_buf()))
        }
    }
}

/// Load configuration from a specific file path.
pub fn load_config(path: &Path) -> Result<BundleConfig, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let contents = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    parse_config(&contents)
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str) -> Result<BundleConfig, ConfigError> {
    let config: BundleConfig = toml::from_str(contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// The built-in catalog used when no bundle.toml exists.
///
/// Two view components, `catalog_v2` and `buyfeedback_v2`, sourced from
/// `frontend/` with the stylus and scss globals as shared aliases.
pub fn default_config() -> BundleConfig {
    BundleConfig {
        project: ProjectConfig { name: "frontend".to_string(), src: PathBuf::from("frontend") },
        environment: EnvironmentConfig::default(),
        output: OutputConfig::default(),
        styles: StylesConfig::default(),
        aliases: default_aliases(),
        resolve: ResolveConfig::default(),
        targets: ["catalog_v2", "buyfeedback_v2"]
            .into_iter()
            .map(|name| TargetConfig { name: name.to_string(), entry: None })
            .collect(),
    }
}

/// Merge CLI overrides into a configuration.
///
/// Only fields that live in the config are merged; the environment
/// override is applied by the caller when the environment is read.
pub fn merge_cli_overrides(config: &mut BundleConfig, overrides: &CliOverrides) {
    if let Some(ref src) = overrides.src {
        config.project.src = src.clone();
    }
}

/// Project root for a config file: its parent directory, or `cwd` for a
/// bare file name.
pub fn project_root(config_path: &Path, cwd: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf())
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
