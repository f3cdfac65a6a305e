//! Preflight checks run before a plan set is handed to the bundler.
//!
//! A partially valid plan set has no meaning, so every missing entry and
//! alias file is collected and reported together.

use crate::build::alias::AssetAlias;
use crate::build::plan::PlanSet;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// A single broken configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightIssue {
    /// Target entry file does not exist
    MissingEntry {
        /// Target name
        target: String,
        /// Expected entry file
        path: PathBuf,
    },
    /// Alias points at a missing file
    MissingAlias {
        /// Alias name
        alias: String,
        /// Expected file
        path: PathBuf,
    },
}

impl std::fmt::Display for PreflightIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreflightIssue::MissingEntry { target, path } => {
                write!(f, "target '{}': entry file not found: {}", target, path.display())
            }
            PreflightIssue::MissingAlias { alias, path } => {
                write!(f, "alias '{}': file not found: {}", alias, path.display())
            }
        }
    }
}

/// Preflight failure listing every broken entry.
#[derive(Debug, Error)]
#[error("Build configuration is broken:\n{}", .0.iter().map(|i| format!("  - {}", i)).collect::<Vec<_>>().join("\n"))]
pub struct PreflightError(pub Vec<PreflightIssue>);

impl PreflightError {
    /// The individual issues.
    pub fn issues(&self) -> &[PreflightIssue] {
        &self.0
    }
}

/// Collect issues without failing.
pub fn collect_issues(plans: &PlanSet, aliases: &[AssetAlias]) -> Vec<PreflightIssue> {
    let mut issues = Vec::new();

    for plan in &plans.plans {
        for path in plan.entry.values() {
            if !path.is_file() {
                warn!(component = %plan.name, path = %path.display(), "entry file missing");
                issues.push(PreflightIssue::MissingEntry {
                    target: plan.name.clone(),
                    path: path.clone(),
                });
            }
        }
    }

    for alias in aliases {
        if !alias.path.is_file() {
            warn!(alias = %alias.name, path = %alias.path.display(), "alias file missing");
            issues.push(PreflightIssue::MissingAlias {
                alias: alias.name.clone(),
                path: alias.path.clone(),
            });
        }
    }

    issues
}

/// Verify every entry and alias file exists.
pub fn check_plan_set(plans: &PlanSet, aliases: &[AssetAlias]) -> Result<(), PreflightError> {
    let issues = collect_issues(plans, aliases);
    if issues.is_empty() {
        debug!(plans = plans.len(), aliases = aliases.len(), "preflight passed");
        Ok(())
    } else {
        Err(PreflightError(issues))
    }
}
