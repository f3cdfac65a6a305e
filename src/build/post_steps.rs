//! Production-only post-processing steps.

use crate::env::Environment;
use serde::Serialize;
use std::collections::BTreeMap;

/// Constant substituted for the environment flag in production bundles.
pub const NODE_ENV_KEY: &str = "process.env.NODE_ENV";

/// Minifier compression settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressOptions {
    /// Emit compression warnings
    pub warnings: bool,
}

/// A transformation applied after primary bundling.
///
/// Serialized with a `plugin` tag naming the bundler plugin that performs
/// the step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "plugin")]
pub enum PostStep {
    /// Substitute compile-time constants so dead-code elimination can strip
    /// development-only branches
    #[serde(rename = "DefinePlugin")]
    DefineConstants {
        /// Expression to replacement source text
        definitions: BTreeMap<String, String>,
    },
    /// Minify emitted code
    #[serde(rename = "UglifyJsPlugin", rename_all = "camelCase")]
    Minify {
        /// Emit source maps for the minified output
        source_map: bool,
        /// Compression settings
        compress: CompressOptions,
    },
    /// Switch loaders into minimizing mode
    #[serde(rename = "LoaderOptionsPlugin")]
    LoaderOptions {
        /// Ask loaders to minimize their output
        minimize: bool,
    },
}

impl PostStep {
    /// Stable identifier for this step.
    pub fn id(&self) -> &'static str {
        match self {
            PostStep::DefineConstants { .. } => "define-constants",
            PostStep::Minify { .. } => "minify",
            PostStep::LoaderOptions { .. } => "loader-options",
        }
    }

    fn define_environment(env: Environment) -> Self {
        let mut definitions = BTreeMap::new();
        definitions.insert(NODE_ENV_KEY.to_string(), format!("\"{}\"", env));
        PostStep::DefineConstants { definitions }
    }
}

/// Post-processing steps for an environment.
///
/// Development gets none. Production substitutes the environment constant
/// first, then minifies, then switches loaders to minimize; minification
/// only strips dead branches once the constant is in place.
pub fn resolve_post_steps(env: Environment) -> Vec<PostStep> {
    match env {
        Environment::Development => Vec::new(),
        Environment::Production => vec![
            PostStep::define_environment(env),
            PostStep::Minify { source_map: true, compress: CompressOptions { warnings: false } },
            PostStep::LoaderOptions { minimize: true },
        ],
    }
}

/// Source-map style for an environment.
pub fn resolve_devtool(env: Environment) -> Option<&'static str> {
    match env {
        Environment::Development => Some("cheap-module-eval-source-map"),
        Environment::Production => None,
    }
}
