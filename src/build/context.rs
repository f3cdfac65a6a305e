//! Build context containing configuration and paths for a resolution.

use crate::config::BundleConfig;
use std::path::{Path, PathBuf};

/// Build context containing configuration and paths for a resolution run.
///
/// The context is immutable once built and shared by reference with
/// every per-target resolution.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: BundleConfig,
    /// Project root directory (where bundle.toml is located)
    project_root: PathBuf,
    /// Optional filter to resolve specific targets only
    target_filter: Option<Vec<String>>,
}

impl BuildContext {
    /// Create a new build context.
    pub fn new(config: BundleConfig, project_root: PathBuf) -> Self {
        Self { config, project_root, target_filter: None }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the source directory (resolved against the project root).
    pub fn src_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.src)
    }

    /// Set target filter to resolve only specific targets.
    pub fn with_filter(mut self, targets: Vec<String>) -> Self {
        self.target_filter = if targets.is_empty() { None } else { Some(targets) };
        self
    }

    /// Get the target filter.
    pub fn target_filter(&self) -> Option<&[String]> {
        self.target_filter.as_deref()
    }

    /// Resolve a path relative to the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        crate::config::loader::resolve_path(&self.project_root, path)
    }
}
