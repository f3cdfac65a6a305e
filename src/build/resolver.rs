//! Build plan resolution.
//!
//! The resolver is a pure function of the build context, the target list
//! and the environment. It performs no I/O; file checks belong to
//! [`crate::build::preflight`].

use crate::build::alias::{resolve_aliases, AssetAlias};
use crate::build::plan::{
    BuildPlan, ModuleSpec, OutputSpec, PerformanceSpec, PlanSet, ResolveSpec,
};
use crate::build::post_steps::{resolve_devtool, resolve_post_steps};
use crate::build::rules::{resolve_extensions, resolve_rules, TransformRule};
use crate::build::target::{is_valid_name, Target};
use crate::build::BuildContext;
use crate::config::{normalize_template, TARGET_PLACEHOLDER};
use crate::env::Environment;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Configuration error raised while resolving plans.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// Target name is not a well-formed identifier
    #[error("Invalid target name '{0}': use letters, digits, '_' or '-'")]
    InvalidTargetName(String),
    /// Same target listed twice
    #[error("Target '{0}' is defined more than once")]
    DuplicateTarget(String),
    /// Requested target is not in the catalog
    #[error("Unknown target '{name}' (available: {})", .available.join(", "))]
    UnknownTarget {
        /// Requested name
        name: String,
        /// Names in the catalog
        available: Vec<String>,
    },
    /// Nothing to resolve
    #[error("No targets to resolve")]
    NoTargets,
}

/// Substitute the target name into a template.
fn expand(template: &str, target: &Target) -> String {
    template.replace(TARGET_PLACEHOLDER, &target.name)
}

/// Output directory and public base path for a target.
///
/// Development and production use different directory templates; the
/// public path is the configured prefix followed by the same relative
/// directory, so both always point at the same place.
pub fn resolve_output_location(
    ctx: &BuildContext,
    target: &Target,
    env: Environment,
) -> (PathBuf, String) {
    let output = &ctx.config().output;
    let template = match env {
        Environment::Development => &output.development,
        Environment::Production => &output.production,
    };
    let relative = normalize_template(&expand(template, target));
    let directory = ctx.project_root().join(&relative);
    let public_path = format!("{}{}", output.public_prefix, relative.display());
    (directory, public_path)
}

/// Resolves build plans for a context.
///
/// Everything that does not depend on the target (rules, aliases,
/// extensions) is computed once in [`Resolver::new`].
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    ctx: &'a BuildContext,
    aliases: Vec<AssetAlias>,
    rules: Vec<TransformRule>,
    extensions: Vec<String>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver for a context.
    pub fn new(ctx: &'a BuildContext) -> Self {
        let styles = &ctx.config().styles;
        Self {
            ctx,
            aliases: resolve_aliases(ctx),
            rules: resolve_rules(styles),
            extensions: resolve_extensions(styles),
        }
    }

    /// The shared alias table.
    pub fn aliases(&self) -> &[AssetAlias] {
        &self.aliases
    }

    /// The static rule table.
    pub fn resolve_rules(&self) -> &[TransformRule] {
        &self.rules
    }

    /// Catalog targets from the configuration, in declaration order.
    pub fn catalog(&self) -> Vec<Target> {
        self.ctx.config().targets.iter().map(Target::from).collect()
    }

    /// Pick catalog targets by name.
    ///
    /// Names not in the catalog are an error. The result keeps catalog
    /// order regardless of the order names were given in.
    pub fn select(&self, names: &[String]) -> Result<Vec<Target>, ResolveError> {
        let catalog = self.catalog();
        for name in names {
            if !catalog.iter().any(|t| t.matches_filter(name)) {
                return Err(ResolveError::UnknownTarget {
                    name: name.clone(),
                    available: catalog.iter().map(|t| t.name.clone()).collect(),
                });
            }
        }
        Ok(catalog.into_iter().filter(|t| names.iter().any(|n| t.matches_filter(n))).collect())
    }

    /// Check names are well formed, unique and present in the catalog.
    fn check_targets(&self, targets: &[Target]) -> Result<(), ResolveError> {
        if targets.is_empty() {
            return Err(ResolveError::NoTargets);
        }

        let catalog = self.catalog();
        let mut seen = HashSet::new();
        for target in targets {
            if !is_valid_name(&target.name) {
                return Err(ResolveError::InvalidTargetName(target.name.clone()));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(ResolveError::DuplicateTarget(target.name.clone()));
            }
            if !catalog.iter().any(|t| t.name == target.name) {
                return Err(ResolveError::UnknownTarget {
                    name: target.name.clone(),
                    available: catalog.iter().map(|t| t.name.clone()).collect(),
                });
            }
        }
        Ok(())
    }

    fn alias_map(&self) -> BTreeMap<String, String> {
        let mut alias: BTreeMap<String, String> = self
            .aliases
            .iter()
            .map(|a| (a.name.clone(), a.path.display().to_string()))
            .collect();
        for (name, request) in &self.ctx.config().resolve.runtime_alias {
            alias.insert(name.clone(), request.clone());
        }
        alias
    }

    /// Resolve a single target.
    pub fn resolve_target(&self, target: &Target, env: Environment) -> BuildPlan {
        let output = &self.ctx.config().output;
        let (path, public_path) = resolve_output_location(self.ctx, target, env);
        let entry_path = self.ctx.src_dir().join(&target.entry_relative_path);

        debug!(component = %target.name, %env, output = %path.display(), "resolved target");

        let mut entry = BTreeMap::new();
        entry.insert(target.name.clone(), entry_path);

        BuildPlan {
            target: target.clone(),
            environment: env,
            name: target.name.clone(),
            entry,
            output: OutputSpec {
                path,
                public_path,
                filename: expand(&output.filename, target),
                chunk_filename: expand(&output.chunk_filename, target),
            },
            module: ModuleSpec { rules: self.rules.clone() },
            resolve: ResolveSpec { extensions: self.extensions.clone(), alias: self.alias_map() },
            performance: PerformanceSpec { hints: false },
            devtool: resolve_devtool(env).map(String::from),
            post_steps: resolve_post_steps(env),
        }
    }

    /// Resolve every target, in input order.
    ///
    /// Fails without producing any plan if a name is malformed, repeated or
    /// missing from the catalog.
    pub fn resolve_all(
        &self,
        targets: &[Target],
        env: Environment,
    ) -> Result<PlanSet, ResolveError> {
        self.check_targets(targets)?;
        let plans = targets.iter().map(|t| self.resolve_target(t, env)).collect();
        Ok(PlanSet { environment: env, plans })
    }

    /// Resolve the context's catalog, honoring its target filter.
    pub fn resolve_catalog(&self, env: Environment) -> Result<PlanSet, ResolveError> {
        let targets = match self.ctx.target_filter() {
            Some(filter) => self.select(filter)?,
            None => self.catalog(),
        };
        self.resolve_all(&targets, env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::post_steps::PostStep;
    use crate::config::default_config;

    fn ctx() -> BuildContext {
        BuildContext::new(default_config(), PathBuf::from("/project"))
    }

    #[test]
    fn test_output_location_development() {
        let ctx = ctx();
        let (dir, public) = resolve_output_location(
            &ctx,
            &Target::conventional("catalog_v2"),
            Environment::Development,
        );
        assert_eq!(dir, PathBuf::from("/project/static/js/catalog_v2"));
        assert_eq!(public, "../../static/js/catalog_v2");
    }

    #[test]
    fn test_output_location_production() {
        let ctx = ctx();
        let (dir, public) = resolve_output_location(
            &ctx,
            &Target::conventional("catalog_v2"),
            Environment::Production,
        );
        assert_eq!(dir, PathBuf::from("/project/components/catalog_v2/static/js"));
        assert_eq!(public, "../../components/catalog_v2/static/js");
    }

    #[test]
    fn test_output_location_normalizes_template() {
        let mut config = default_config();
        config.output.production = "./dist/{target}/".to_string();
        let ctx = BuildContext::new(config, PathBuf::from("/project"));
        let (dir, public) = resolve_output_location(
            &ctx,
            &Target::conventional("catalog_v2"),
            Environment::Production,
        );
        assert_eq!(dir, PathBuf::from("/project/dist/catalog_v2"));
        assert_eq!(public, "../../dist/catalog_v2");
    }

    #[test]
    fn test_resolve_target_development() {
        let ctx = ctx();
        let resolver = Resolver::new(&ctx);
        let plan =
            resolver.resolve_target(&Target::conventional("catalog_v2"), Environment::Development);

        assert_eq!(plan.name, "catalog_v2");
        assert_eq!(
            plan.entry_path(),
            Some(&PathBuf::from("/project/frontend/catalog_v2/main.js"))
        );
        assert_eq!(plan.output.filename, "catalog_v2.js");
        assert_eq!(plan.output.chunk_filename, "catalog_v2.[id].js");
        assert_eq!(plan.devtool.as_deref(), Some("cheap-module-eval-source-map"));
        assert!(plan.post_steps.is_empty());
        assert_eq!(plan.module.rules.len(), 5);
        assert!(!plan.performance.hints);
        assert_eq!(
            plan.resolve.alias.get("globalStyl").map(String::as_str),
            Some("/project/frontend/assets/styl/_global.styl")
        );
    }

    #[test]
    fn test_resolve_target_production() {
        let ctx = ctx();
        let resolver = Resolver::new(&ctx);
        let plan =
            resolver.resolve_target(&Target::conventional("catalog_v2"), Environment::Production);

        assert!(plan.devtool.is_none());
        assert!(matches!(plan.post_steps[0], PostStep::DefineConstants { .. }));
        assert_eq!(plan.environment, Environment::Production);
    }

    #[test]
    fn test_resolve_all_keeps_order() {
        let ctx = ctx();
        let resolver = Resolver::new(&ctx);
        let targets = vec![
            Target::conventional("buyfeedback_v2"),
            Target::conventional("catalog_v2"),
        ];
        let set = resolver.resolve_all(&targets, Environment::Development).unwrap();
        assert_eq!(set.names(), vec!["buyfeedback_v2", "catalog_v2"]);
    }

    #[test]
    fn test_resolve_all_rejects_duplicates() {
        let ctx = ctx();
        let resolver = Resolver::new(&ctx);
        let targets = vec![Target::conventional("catalog_v2"), Target::conventional("catalog_v2")];
        let err = resolver.resolve_all(&targets, Environment::Development).unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateTarget(ref n) if n == "catalog_v2"));
    }

    #[test]
    fn test_resolve_all_rejects_malformed_name() {
        let ctx = ctx();
        let resolver = Resolver::new(&ctx);
        let targets = vec![Target::new("bad/name", "bad/main.js")];
        let err = resolver.resolve_all(&targets, Environment::Production).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidTargetName(_)));
        assert!(err.to_string().contains("bad/name"));
    }

    #[test]
    fn test_resolve_all_rejects_unknown_target() {
        let ctx = ctx();
        let resolver = Resolver::new(&ctx);
        let targets = vec![Target::conventional("catalog_v2"), Target::conventional("checkout_v1")];
        match resolver.resolve_all(&targets, Environment::Production) {
            Err(ResolveError::UnknownTarget { name, available }) => {
                assert_eq!(name, "checkout_v1");
                assert_eq!(available, vec!["catalog_v2", "buyfeedback_v2"]);
            }
            other => panic!("expected UnknownTarget, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_all_accepts_catalog_target_with_custom_entry() {
        let ctx = ctx();
        let resolver = Resolver::new(&ctx);
        let targets = vec![Target::new("catalog_v2", "catalog_v2/index.js")];
        let set = resolver.resolve_all(&targets, Environment::Development).unwrap();
        assert_eq!(
            set.plans[0].entry_path(),
            Some(&PathBuf::from("/project/frontend/catalog_v2/index.js"))
        );
    }

    #[test]
    fn test_resolve_all_rejects_empty() {
        let ctx = ctx();
        let resolver = Resolver::new(&ctx);
        assert!(matches!(
            resolver.resolve_all(&[], Environment::Development),
            Err(ResolveError::NoTargets)
        ));
    }

    #[test]
    fn test_select_unknown_target() {
        let ctx = ctx();
        let resolver = Resolver::new(&ctx);
        let err = resolver.select(&["checkout_v1".to_string()]).unwrap_err();
        match err {
            ResolveError::UnknownTarget { name, available } => {
                assert_eq!(name, "checkout_v1");
                assert_eq!(available, vec!["catalog_v2", "buyfeedback_v2"]);
            }
            other => panic!("expected UnknownTarget, got {:?}", other),
        }
    }

    #[test]
    fn test_select_keeps_catalog_order() {
        let ctx = ctx();
        let resolver = Resolver::new(&ctx);
        let selected = resolver
            .select(&["buyfeedback_v2".to_string(), "catalog_v2".to_string()])
            .unwrap();
        let names: Vec<_> = selected.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["catalog_v2", "buyfeedback_v2"]);
    }

    #[test]
    fn test_resolve_catalog_with_filter() {
        let ctx = ctx().with_filter(vec!["buyfeedback_v2".to_string()]);
        let resolver = Resolver::new(&ctx);
        let set = resolver.resolve_catalog(Environment::Production).unwrap();
        assert_eq!(set.names(), vec!["buyfeedback_v2"]);
    }

    #[test]
    fn test_runtime_alias_pinned() {
        let mut config = default_config();
        config
            .resolve
            .runtime_alias
            .insert("vue$".to_string(), "vue/dist/vue.esm.js".to_string());
        let ctx = BuildContext::new(config, PathBuf::from("/project"));
        let resolver = Resolver::new(&ctx);

        let plan =
            resolver.resolve_target(&Target::conventional("catalog_v2"), Environment::Development);
        assert_eq!(plan.resolve.alias.get("vue$").map(String::as_str), Some("vue/dist/vue.esm.js"));
        assert_eq!(plan.resolve.alias.len(), 3);
    }
}
