//! Configuration schema types for `bundle.toml`
//!
//! Defines the structure and validation rules for a bundleplan project
//! configuration.

use crate::build::target::is_valid_name;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};

/// Placeholder substituted with the target name in output templates.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Normalize a relative directory template.
///
/// Drops `.` components and trailing separators, so `./out/{target}/` and
/// `out/{target}` name the same directory.
pub fn normalize_template(template: &str) -> PathBuf {
    Path::new(template).components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

/// Style-sheet dialect handled by the style preprocessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleDialect {
    /// Plain CSS, run through postcss only
    Css,
    /// SCSS and indented Sass
    Scss,
    /// Stylus
    Stylus,
}

impl StyleDialect {
    /// All dialects in rule-table order.
    pub const ALL: [StyleDialect; 3] =
        [StyleDialect::Css, StyleDialect::Scss, StyleDialect::Stylus];
}

impl std::fmt::Display for StyleDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StyleDialect::Css => write!(f, "css"),
            StyleDialect::Scss => write!(f, "scss"),
            StyleDialect::Stylus => write!(f, "stylus"),
        }
    }
}

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required)
    pub name: String,
    /// Source directory holding component folders and shared assets
    #[serde(default = "default_src")]
    pub src: PathBuf,
}

fn default_src() -> PathBuf {
    PathBuf::from("frontend")
}

/// Where the environment flag is read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Name of the environment variable
    #[serde(default = "default_env_variable")]
    pub variable: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self { variable: default_env_variable() }
    }
}

fn default_env_variable() -> String {
    "NODE_ENV".to_string()
}

/// Output location and naming templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Development output directory, relative to the project root
    #[serde(default = "default_dev_template")]
    pub development: String,
    /// Production output directory, relative to the project root
    #[serde(default = "default_prod_template")]
    pub production: String,
    /// Prefix prepended to the directory template to form the public path
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Output filename pattern
    #[serde(default = "default_filename")]
    pub filename: String,
    /// Filename pattern for split chunks
    #[serde(default = "default_chunk_filename")]
    pub chunk_filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            development: default_dev_template(),
            production: default_prod_template(),
            public_prefix: default_public_prefix(),
            filename: default_filename(),
            chunk_filename: default_chunk_filename(),
        }
    }
}

fn default_dev_template() -> String {
    "static/js/{target}".to_string()
}

fn default_prod_template() -> String {
    "components/{target}/static/js".to_string()
}

fn default_public_prefix() -> String {
    "../../".to_string()
}

fn default_filename() -> String {
    "{target}.js".to_string()
}

fn default_chunk_filename() -> String {
    "{target}.[id].js".to_string()
}

/// Style preprocessing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylesConfig {
    /// Enabled style dialects
    #[serde(default = "default_dialects")]
    pub dialects: Vec<StyleDialect>,
    /// Alias imported by every stylus block
    #[serde(default = "default_stylus_alias")]
    pub stylus_alias: String,
    /// Alias imported by every scss/sass block
    #[serde(default = "default_scss_alias")]
    pub scss_alias: String,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            dialects: default_dialects(),
            stylus_alias: default_stylus_alias(),
            scss_alias: default_scss_alias(),
        }
    }
}

impl StylesConfig {
    /// Whether a dialect is enabled.
    pub fn is_enabled(&self, dialect: StyleDialect) -> bool {
        self.dialects.contains(&dialect)
    }
}

fn default_dialects() -> Vec<StyleDialect> {
    StyleDialect::ALL.to_vec()
}

fn default_stylus_alias() -> String {
    "globalStyl".to_string()
}

fn default_scss_alias() -> String {
    "globalScss".to_string()
}

pub(crate) fn default_aliases() -> BTreeMap<String, PathBuf> {
    let mut aliases = BTreeMap::new();
    aliases.insert(default_stylus_alias(), PathBuf::from("assets/styl/_global.styl"));
    aliases.insert(default_scss_alias(), PathBuf::from("assets/scss/_global.scss"));
    aliases
}

/// Extra module resolution settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolveConfig {
    /// Pinned framework runtime aliases (e.g. `vue$` -> `vue/dist/vue.esm.js`)
    #[serde(default)]
    pub runtime_alias: BTreeMap<String, String>,
}

/// A single `[[targets]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Target name, also the bundle name
    pub name: String,
    /// Entry file relative to the source directory (default `<name>/main.js`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,
}

impl TargetConfig {
    /// Entry path relative to the source directory.
    pub fn entry_path(&self) -> PathBuf {
        self.entry.clone().unwrap_or_else(|| PathBuf::from(&self.name).join("main.js"))
    }
}

/// Complete bundle.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Project metadata (required)
    pub project: ProjectConfig,
    /// Environment flag source
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Output templates
    #[serde(default)]
    pub output: OutputConfig,
    /// Style dialects
    #[serde(default)]
    pub styles: StylesConfig,
    /// Shared asset aliases, paths relative to the source directory
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, PathBuf>,
    /// Module resolution extras
    #[serde(default)]
    pub resolve: ResolveConfig,
    /// Build targets, in build order
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "targets[1].name")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bundle.toml: '{}' {}", self.field, self.message)
    }
}

impl BundleConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.project.name.is_empty() {
            errors.push(ConfigValidationError {
                field: "project.name".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if self.environment.variable.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "environment.variable".to_string(),
                message: "must name an environment variable".to_string(),
            });
        }

        self.validate_output(&mut errors);
        self.validate_aliases(&mut errors);

        if self.targets.is_empty() {
            errors.push(ConfigValidationError {
                field: "targets".to_string(),
                message: "must define at least one target".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, target) in self.targets.iter().enumerate() {
            if !is_valid_name(&target.name) {
                errors.push(ConfigValidationError {
                    field: format!("targets[{}].name", i),
                    message: format!(
                        "'{}' must start with a letter or digit and contain only letters, digits, '_' or '-'",
                        target.name
                    ),
                });
            } else if !seen.insert(target.name.as_str()) {
                errors.push(ConfigValidationError {
                    field: format!("targets[{}].name", i),
                    message: format!("'{}' is defined more than once", target.name),
                });
            }

            if let Some(entry) = &target.entry {
                if entry.is_absolute() {
                    errors.push(ConfigValidationError {
                        field: format!("targets[{}].entry", i),
                        message: "must be relative to the source directory".to_string(),
                    });
                }
            }
        }

        errors
    }

    fn validate_output(&self, errors: &mut Vec<ConfigValidationError>) {
        let templates = [
            ("output.development", &self.output.development),
            ("output.production", &self.output.production),
            ("output.filename", &self.output.filename),
        ];
        for (field, template) in templates {
            if !template.contains(TARGET_PLACEHOLDER) {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: format!("must contain the {} placeholder", TARGET_PLACEHOLDER),
                });
            }
        }

        if normalize_template(&self.output.development)
            == normalize_template(&self.output.production)
        {
            errors.push(ConfigValidationError {
                field: "output.production".to_string(),
                message: "must differ from output.development".to_string(),
            });
        }
    }

    fn validate_aliases(&self, errors: &mut Vec<ConfigValidationError>) {
        for name in self.aliases.keys() {
            if !is_valid_name(name) {
                errors.push(ConfigValidationError {
                    field: format!("aliases.{}", name),
                    message: "is not a valid alias name".to_string(),
                });
            }
        }

        for name in self.resolve.runtime_alias.keys() {
            if self.aliases.contains_key(name) {
                errors.push(ConfigValidationError {
                    field: format!("resolve.runtime_alias.{}", name),
                    message: "collides with an entry in [aliases]".to_string(),
                });
            }
        }

        let required = [
            (StyleDialect::Stylus, "styles.stylus_alias", &self.styles.stylus_alias),
            (StyleDialect::Scss, "styles.scss_alias", &self.styles.scss_alias),
        ];
        for (dialect, field, alias) in required {
            if self.styles.is_enabled(dialect) && !self.aliases.contains_key(alias.as_str()) {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: format!("'{}' is not defined in [aliases]", alias),
                });
            }
        }
    }
}
