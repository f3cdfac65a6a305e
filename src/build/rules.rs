//! Source transformation rules.
//!
//! One rule per supported source kind maps a file-extension pattern to an
//! ordered chain of loaders. The table is static; only the set of enabled
//! style dialects changes which rules are present.

use crate::config::{StyleDialect, StylesConfig};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static CSS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.css$").expect("Invalid Regex"));
static SCSS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(scss|sass)$").expect("Invalid Regex"));
static STYLUS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(styl|stylus)$").expect("Invalid Regex"));
static TEMPLATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.vue$").expect("Invalid Regex"));
static SCRIPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.js$").expect("Invalid Regex"));

/// Third-party sources the script transpiler never touches.
pub const DEPENDENCY_EXCLUDE: &str = "node_modules";

/// CSS class-name scoping pattern for component templates.
pub const LOCAL_IDENT_NAME: &str = "[name]---[hash:base64:5]";

const STYLE_LOADER: &str = "vue-style-loader";
const CSS_LOADER: &str = "css-loader";
const POSTCSS_LOADER: &str = "postcss-loader";
const SASS_LOADER: &str = "sass-loader";
const STYLUS_LOADER: &str = "stylus-loader";
const TEMPLATE_LOADER: &str = "vue-loader";
const SCRIPT_LOADER: &str = "babel-loader";

/// Kind of source file a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Plain CSS
    Css,
    /// SCSS / Sass
    Scss,
    /// Stylus
    Stylus,
    /// Single-file component templates
    Template,
    /// Legacy-syntax scripts
    Script,
}

impl SourceKind {
    /// File-extension pattern for this kind.
    pub fn pattern(self) -> &'static Regex {
        match self {
            SourceKind::Css => &*CSS_PATTERN,
            SourceKind::Scss => &*SCSS_PATTERN,
            SourceKind::Stylus => &*STYLUS_PATTERN,
            SourceKind::Template => &*TEMPLATE_PATTERN,
            SourceKind::Script => &*SCRIPT_PATTERN,
        }
    }
}

impl From<StyleDialect> for SourceKind {
    fn from(dialect: StyleDialect) -> Self {
        match dialect {
            StyleDialect::Css => SourceKind::Css,
            StyleDialect::Scss => SourceKind::Scss,
            StyleDialect::Stylus => SourceKind::Stylus,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Css => write!(f, "css"),
            SourceKind::Scss => write!(f, "scss"),
            SourceKind::Stylus => write!(f, "stylus"),
            SourceKind::Template => write!(f, "template"),
            SourceKind::Script => write!(f, "script"),
        }
    }
}

/// CSS modules settings passed to the template loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssModules {
    /// Scoped class-name pattern
    pub local_ident_name: String,
    /// Export class names in camelCase
    pub camel_case: bool,
}

/// Template loader options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOptions {
    /// Loader chain per language block (`lang="scss"` etc.)
    pub loaders: BTreeMap<String, String>,
    /// CSS modules naming
    pub css_modules: CssModules,
    /// Autoprefixing is left to postcss
    pub autoprefixer: bool,
}

/// Options attached to a single loader step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StepOptions {
    /// Template loader options
    Template(TemplateOptions),
}

/// One processing step of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderStep {
    /// Loader identifier
    pub loader: String,
    /// Loader options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<StepOptions>,
}

impl LoaderStep {
    /// A step with no options.
    pub fn plain(loader: &str) -> Self {
        Self { loader: loader.to_string(), options: None }
    }
}

/// A transformation rule: extension pattern to ordered loader chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformRule {
    /// Source kind this rule handles
    #[serde(skip)]
    pub kind: SourceKind,
    /// File-extension pattern (regex source)
    pub test: String,
    /// Loader chain, applied last to first by the bundler
    #[serde(rename = "use")]
    pub steps: Vec<LoaderStep>,
    /// Path pattern excluded from this rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

impl TransformRule {
    fn new(kind: SourceKind, steps: Vec<LoaderStep>) -> Self {
        Self { kind, test: kind.pattern().as_str().to_string(), steps, exclude: None }
    }

    /// Loader identifiers in order.
    pub fn loaders(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.loader.as_str()).collect()
    }

    /// Whether this rule applies to a path.
    pub fn matches(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        if let Some(exclude) = &self.exclude {
            if path.components().any(|c| c.as_os_str() == exclude.as_str()) {
                return false;
            }
        }
        self.kind.pattern().is_match(&path_str)
    }
}

fn style_rule(dialect: StyleDialect) -> TransformRule {
    let mut steps = vec![
        LoaderStep::plain(STYLE_LOADER),
        LoaderStep::plain(CSS_LOADER),
        LoaderStep::plain(POSTCSS_LOADER),
    ];
    match dialect {
        StyleDialect::Css => {}
        StyleDialect::Scss => steps.push(LoaderStep::plain(SASS_LOADER)),
        StyleDialect::Stylus => steps.push(LoaderStep::plain(STYLUS_LOADER)),
    }
    TransformRule::new(dialect.into(), steps)
}

/// Loader chain string for a `<style lang="...">` block inside a template.
///
/// The chain strips comments, emits postcss source maps and prepends the
/// shared global definitions through the dialect's alias.
pub fn sub_loader_chain(dialect: StyleDialect, styles: &StylesConfig) -> String {
    let css = format!("{}?{{discardComments:{{removeAll:true}}}}", CSS_LOADER);
    let postcss = format!("{}?sourceMap", POSTCSS_LOADER);
    let current = match dialect {
        StyleDialect::Stylus => {
            format!("{}?include css&import=~{}", STYLUS_LOADER, styles.stylus_alias)
        }
        StyleDialect::Scss => format!("{}?data=@import '~{}';", SASS_LOADER, styles.scss_alias),
        StyleDialect::Css => String::new(),
    };

    if current.is_empty() {
        format!("{}!{}!{}", STYLE_LOADER, css, postcss)
    } else {
        format!("{}!{}!{}!{}", STYLE_LOADER, css, postcss, current)
    }
}

fn template_rule(styles: &StylesConfig) -> TransformRule {
    let mut loaders = BTreeMap::new();
    if styles.is_enabled(StyleDialect::Scss) {
        let chain = sub_loader_chain(StyleDialect::Scss, styles);
        loaders.insert("sass".to_string(), chain.clone());
        loaders.insert("scss".to_string(), chain);
    }
    if styles.is_enabled(StyleDialect::Stylus) {
        loaders.insert("stylus".to_string(), sub_loader_chain(StyleDialect::Stylus, styles));
    }

    let options = TemplateOptions {
        loaders,
        css_modules: CssModules {
            local_ident_name: LOCAL_IDENT_NAME.to_string(),
            camel_case: true,
        },
        autoprefixer: false,
    };

    TransformRule::new(
        SourceKind::Template,
        vec![LoaderStep {
            loader: TEMPLATE_LOADER.to_string(),
            options: Some(StepOptions::Template(options)),
        }],
    )
}

fn script_rule() -> TransformRule {
    let mut rule = TransformRule::new(SourceKind::Script, vec![LoaderStep::plain(SCRIPT_LOADER)]);
    rule.exclude = Some(DEPENDENCY_EXCLUDE.to_string());
    rule
}

/// Return the rule table for the enabled style dialects.
///
/// Order: style rules (css, scss, stylus), templates, scripts.
pub fn resolve_rules(styles: &StylesConfig) -> Vec<TransformRule> {
    let mut rules: Vec<TransformRule> = StyleDialect::ALL
        .into_iter()
        .filter(|d| styles.is_enabled(*d))
        .map(style_rule)
        .collect();
    rules.push(template_rule(styles));
    rules.push(script_rule());
    rules
}

/// Module resolution extensions for the enabled style dialects.
pub fn resolve_extensions(styles: &StylesConfig) -> Vec<String> {
    let mut extensions = vec!["*"];
    if styles.is_enabled(StyleDialect::Css) {
        extensions.push(".css");
    }
    if styles.is_enabled(StyleDialect::Scss) {
        extensions.extend([".scss", ".sass"]);
    }
    if styles.is_enabled(StyleDialect::Stylus) {
        extensions.push(".styl");
    }
    extensions.extend([".js", ".vue", ".json"]);
    extensions.into_iter().map(String::from).collect()
}

/// Find the first rule that handles a path.
pub fn rule_for<'a>(rules: &'a [TransformRule], path: &Path) -> Option<&'a TransformRule> {
    rules.iter().find(|r| r.matches(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles_with(dialects: &[StyleDialect]) -> StylesConfig {
        StylesConfig { dialects: dialects.to_vec(), ..StylesConfig::default() }
    }

    #[test]
    fn test_default_rule_table_order() {
        let rules = resolve_rules(&StylesConfig::default());
        let kinds: Vec<_> = rules.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SourceKind::Css,
                SourceKind::Scss,
                SourceKind::Stylus,
                SourceKind::Template,
                SourceKind::Script
            ]
        );
    }

    #[test]
    fn test_style_rule_chains() {
        let rules = resolve_rules(&StylesConfig::default());
        assert_eq!(rules[0].loaders(), vec!["vue-style-loader", "css-loader", "postcss-loader"]);
        assert_eq!(
            rules[1].loaders(),
            vec!["vue-style-loader", "css-loader", "postcss-loader", "sass-loader"]
        );
        assert_eq!(
            rules[2].loaders(),
            vec!["vue-style-loader", "css-loader", "postcss-loader", "stylus-loader"]
        );
        assert_eq!(rules[1].test, r"\.(scss|sass)$");
    }

    #[test]
    fn test_script_rule_excludes_dependencies() {
        let rules = resolve_rules(&StylesConfig::default());
        let script = rules.last().unwrap();
        assert_eq!(script.loaders(), vec!["babel-loader"]);
        assert_eq!(script.exclude.as_deref(), Some("node_modules"));
        assert!(script.matches(Path::new("frontend/catalog_v2/main.js")));
        assert!(!script.matches(Path::new("node_modules/vue/dist/vue.js")));
    }

    #[test]
    fn test_template_options() {
        let rules = resolve_rules(&StylesConfig::default());
        let template = &rules[3];
        let Some(StepOptions::Template(options)) = &template.steps[0].options else {
            panic!("template rule should carry options");
        };

        assert_eq!(options.css_modules.local_ident_name, "[name]---[hash:base64:5]");
        assert!(options.css_modules.camel_case);
        assert!(!options.autoprefixer);
        let keys: Vec<_> = options.loaders.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["sass", "scss", "stylus"]);
    }

    #[test]
    fn test_sub_loader_chains() {
        let styles = StylesConfig::default();
        assert_eq!(
            sub_loader_chain(StyleDialect::Stylus, &styles),
            "vue-style-loader!css-loader?{discardComments:{removeAll:true}}!postcss-loader?sourceMap!stylus-loader?include css&import=~globalStyl"
        );
        assert_eq!(
            sub_loader_chain(StyleDialect::Scss, &styles),
            "vue-style-loader!css-loader?{discardComments:{removeAll:true}}!postcss-loader?sourceMap!sass-loader?data=@import '~globalScss';"
        );
        assert!(!sub_loader_chain(StyleDialect::Css, &styles).ends_with('!'));
    }

    #[test]
    fn test_disabled_dialect_removed() {
        let styles = styles_with(&[StyleDialect::Css, StyleDialect::Scss]);
        let rules = resolve_rules(&styles);

        assert!(!rules.iter().any(|r| r.kind == SourceKind::Stylus));
        let Some(StepOptions::Template(options)) = &rules[2].steps[0].options else {
            panic!("template rule should carry options");
        };
        assert!(!options.loaders.contains_key("stylus"));
        assert!(options.loaders.contains_key("scss"));
    }

    #[test]
    fn test_resolve_extensions() {
        assert_eq!(
            resolve_extensions(&StylesConfig::default()),
            vec!["*", ".css", ".scss", ".sass", ".styl", ".js", ".vue", ".json"]
        );
        assert_eq!(
            resolve_extensions(&styles_with(&[StyleDialect::Stylus])),
            vec!["*", ".styl", ".js", ".vue", ".json"]
        );
    }

    #[test]
    fn test_rule_for() {
        let rules = resolve_rules(&StylesConfig::default());
        let kind = |p: &str| rule_for(&rules, Path::new(p)).map(|r| r.kind);

        assert_eq!(kind("a/b.vue"), Some(SourceKind::Template));
        assert_eq!(kind("a/b.sass"), Some(SourceKind::Scss));
        assert_eq!(kind("a/b.stylus"), Some(SourceKind::Stylus));
        assert_eq!(kind("a/b.css"), Some(SourceKind::Css));
        assert_eq!(kind("a/b.ts"), None);
    }

    #[test]
    fn test_rule_serialization() {
        let rules = resolve_rules(&StylesConfig::default());
        let json = serde_json::to_value(&rules[4]).unwrap();
        assert_eq!(json["test"], r"\.js$");
        assert_eq!(json["use"][0]["loader"], "babel-loader");
        assert_eq!(json["exclude"], "node_modules");
        assert!(json.get("kind").is_none());

        let template = serde_json::to_value(&rules[3]).unwrap();
        assert_eq!(
            template["use"][0]["options"]["cssModules"]["localIdentName"],
            "[name]---[hash:base64:5]"
        );
    }
}
