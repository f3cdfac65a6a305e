//! Resolve command implementation

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use tracing::info;

use super::{environment_for, load_context, EXIT_ERROR, EXIT_SUCCESS};
use crate::build::{check_plan_set, PlanFormat, Resolver};
use crate::config::loader::CliOverrides;

/// Run the resolve command
pub fn run_resolve(
    config: Option<&Path>,
    overrides: &CliOverrides,
    targets: &[String],
    format: PlanFormat,
    output: Option<&Path>,
    check: bool,
) -> ExitCode {
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

    if check {
        if let Err(e) = check_plan_set(&plans, resolver.aliases()) {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let rendered = match plans.render(format) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, rendered) {
                eprintln!("Error: Failed to write {}: {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
            info!(plans = plans.len(), %env, path = %path.display(), "wrote build plans");
        }
        None => println!("{}", rendered),
    }

    ExitCode::from(EXIT_SUCCESS)
}
