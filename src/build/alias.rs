//! Shared asset aliases.
//!
//! Aliases bind a short symbolic name to an absolute path so per-component
//! style files can import shared global definitions (`@import '~globalScss'`)
//! without relative-path fragility.

use crate::build::BuildContext;
use std::path::PathBuf;

/// A symbolic name bound to an absolute shared-asset path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAlias {
    /// Alias name as used in imports
    pub name: String,
    /// Absolute file path the alias points to
    pub path: PathBuf,
}

impl AssetAlias {
    /// Create an alias.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), path: path.into() }
    }
}

/// Build the alias table for a context.
///
/// Relative alias paths are resolved against the source directory. The
/// table is sorted by alias name.
pub fn resolve_aliases(ctx: &BuildContext) -> Vec<AssetAlias> {
    let src_dir = ctx.src_dir();
    ctx.config()
        .aliases
        .iter()
        .map(|(name, path)| {
            let path = if path.is_absolute() { path.clone() } else { src_dir.join(path) };
            AssetAlias::new(name.clone(), path)
        })
        .collect()
}
