//! Inspection commands (check, targets)

use std::path::Path;
use std::process::ExitCode;

use super::{environment_for, load_context, EXIT_ERROR, EXIT_SUCCESS};
use crate::build::{collect_issues, rule_for, Resolver};
use crate::config::loader::CliOverrides;

/// Run the check command
pub fn run_check(config: Option<&Path>, overrides: &CliOverrides, targets: &[String]) -> ExitCode {
    let ctx = match load_context(config, overrides) {
        Ok(ctx) => ctx.with_filter(targets.to_vec()),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let env = environment_for(&ctx, overrides);
    let resolver = Resolver::new(&ctx);

    let plans = match resolver.resolve_catalog(env) {
        Ok(plans) => plans,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    println!("Environment: {}", env);
    for plan in &plans.plans {
        let handler = plan
            .entry_path()
            .and_then(|entry| rule_for(resolver.resolve_rules(), entry))
            .map(|rule| rule.loaders().join(" -> "))
            .unwrap_or_else(|| "no matching rule".to_string());
        println!("  {}", plan.name);
        println!("    entry:  {}", plan.target.entry_relative_path.display());
        println!("    loader: {}", handler);
        println!("    output: {}", plan.output_dir().display());
        println!("    public: {}", plan.output.public_path);
        if !plan.post_steps.is_empty() {
            let steps: Vec<_> = plan.post_steps.iter().map(|s| s.id()).collect();
            println!("    post:   {}", steps.join(", "));
        }
    }

    let issues = collect_issues(&plans, resolver.aliases());
    if issues.is_empty() {
        println!("OK: {} target(s), {} alias(es)", plans.len(), resolver.aliases().len());
        ExitCode::from(EXIT_SUCCESS)
    } else {
        for issue in &issues {
            eprintln!("Error: {}", issue);
        }
        eprintln!("{} problem(s) found", issues.len());
        ExitCode::from(EXIT_ERROR)
    }
}

/// Run the targets command
pub fn run_targets(config: Option<&Path>) -> ExitCode {
    let ctx = match load_context(config, &CliOverrides::default()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    for target in Resolver::new(&ctx).catalog() {
        println!("{}", target);
    }
    ExitCode::from(EXIT_SUCCESS)
}
