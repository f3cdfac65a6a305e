//! Resolved build plans.
//!
//! A [`BuildPlan`] is the fully resolved bundler configuration for one
//! target in one environment. Plans serialize into the shape the bundler
//! engine consumes, with one named configuration per target.

use crate::build::post_steps::PostStep;
use crate::build::rules::TransformRule;
use crate::build::target::Target;
use crate::env::Environment;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Output location and naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    /// Directory bundles are written to
    pub path: PathBuf,
    /// Relative URL prefix the bundles are served from
    pub public_path: String,
    /// Entry bundle filename pattern
    pub filename: String,
    /// Split chunk filename pattern
    pub chunk_filename: String,
}

/// Module rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSpec {
    /// Transformation rules in match order
    pub rules: Vec<TransformRule>,
}

/// Module resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveSpec {
    /// Extensions tried when an import omits one
    pub extensions: Vec<String>,
    /// Alias name to absolute path or module request
    pub alias: BTreeMap<String, String>,
}

/// Bundle-size performance hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceSpec {
    /// Hints are disabled for component bundles
    pub hints: bool,
}

/// Fully resolved configuration for one target in one environment.
///
/// Built once by the resolver and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    /// The target this plan bundles
    #[serde(skip)]
    pub target: Target,
    /// Environment the plan was resolved for
    #[serde(skip)]
    pub environment: Environment,
    /// Configuration name (the target name)
    pub name: String,
    /// Entry chunk name to absolute entry file
    pub entry: BTreeMap<String, PathBuf>,
    /// Output location and naming
    pub output: OutputSpec,
    /// Transformation rules
    pub module: ModuleSpec,
    /// Module resolution settings
    pub resolve: ResolveSpec,
    /// Performance hints
    pub performance: PerformanceSpec,
    /// Source-map style, development only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devtool: Option<String>,
    /// Post-processing steps, production only
    #[serde(rename = "plugins")]
    pub post_steps: Vec<PostStep>,
}

impl BuildPlan {
    /// Absolute path of the entry file.
    pub fn entry_path(&self) -> Option<&PathBuf> {
        self.entry.get(&self.target.name)
    }

    /// Output directory.
    pub fn output_dir(&self) -> &PathBuf {
        &self.output.path
    }
}

/// Serialization format for a plan set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    /// Pretty-printed JSON array of configurations
    #[default]
    Json,
    /// TOML document with a `configs` array
    Toml,
}

/// Error serializing a plan set.
#[derive(Debug, thiserror::Error)]
pub enum PlanFormatError {
    /// JSON serialization failed
    #[error("Failed to serialize plans as JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// TOML serialization failed
    #[error("Failed to serialize plans as TOML: {0}")]
    Toml(#[from] toml::ser::Error),
}

/// All plans of one resolution run, in target order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSet {
    /// Environment every plan was resolved for
    pub environment: Environment,
    /// Plans in target order
    pub plans: Vec<BuildPlan>,
}

#[derive(Serialize)]
struct TomlDocument<'a> {
    environment: Environment,
    configs: &'a [BuildPlan],
}

impl PlanSet {
    /// Number of plans.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Whether the set has no plans.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Look up a plan by target name.
    pub fn get(&self, name: &str) -> Option<&BuildPlan> {
        self.plans.iter().find(|p| p.name == name)
    }

    /// Target names in plan order.
    pub fn names(&self) -> Vec<&str> {
        self.plans.iter().map(|p| p.name.as_str()).collect()
    }

    /// Serialize as a pretty JSON array.
    pub fn to_json(&self) -> Result<String, PlanFormatError> {
        Ok(serde_json::to_string_pretty(&self.plans)?)
    }

    /// Serialize as a TOML document.
    pub fn to_toml(&self) -> Result<String, PlanFormatError> {
        let doc = TomlDocument { environment: self.environment, configs: &self.plans };
        Ok(toml::to_string_pretty(&doc)?)
    }

    /// Serialize in the requested format.
    pub fn render(&self, format: PlanFormat) -> Result<String, PlanFormatError> {
        match format {
            PlanFormat::Json => self.to_json(),
            PlanFormat::Toml => self.to_toml(),
        }
    }
}
