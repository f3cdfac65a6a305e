//! Build target definitions.
//!
//! A target is one independently bundled front-end component with its own
//! entry file.

use crate::config::TargetConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("Invalid Regex"));

/// Check whether a target or alias name is a well-formed identifier.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// A component to bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// Target name, used as bundle and entry-chunk name
    pub name: String,
    /// Entry file relative to the source directory
    pub entry_relative_path: PathBuf,
}

impl Target {
    /// Create a target with an explicit entry path.
    pub fn new(name: impl Into<String>, entry: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), entry_relative_path: entry.into() }
    }

    /// Create a target using the conventional `<name>/main.js` entry.
    pub fn conventional(name: impl Into<String>) -> Self {
        let name = name.into();
        let entry = Path::new(&name).join("main.js");
        Self { name, entry_relative_path: entry }
    }

    /// Check if this target matches a filter string.
    ///
    /// Supports an exact name or `*` for every target.
    pub fn matches_filter(&self, filter: &str) -> bool {
        filter == "*" || self.name == filter
    }
}

impl From<&TargetConfig> for Target {
    fn from(config: &TargetConfig) -> Self {
        Self { name: config.name.clone(), entry_relative_path: config.entry_path() }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.entry_relative_path.display())
    }
}
