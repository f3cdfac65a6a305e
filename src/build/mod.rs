//! Build plan resolution for bundleplan
//!
//! Turns the target catalog and the environment flag into one fully
//! resolved bundler configuration per target.
//!
//! # Overview
//!
//! Resolution consists of:
//! - **Context**: loaded configuration plus the project root
//! - **Resolution**: a pure pass producing a [`PlanSet`] in target order
//! - **Preflight**: file-existence checks for entries and aliases
//!
//! # Example
//!
//! ```ignore
//! use bundleplan::build::{BuildContext, Resolver};
//! use bundleplan::config::load_project;
//! use bundleplan::env::Environment;
//!
//! let cwd = std::env::current_dir()?;
//! let (config, project_root) = load_project(None, &cwd)?;
//! let context = BuildContext::new(config, project_root);
//! let resolver = Resolver::new(&context);
//!
//! let plans = resolver.resolve_catalog(Environment::Production)?;
//! println!("{}", plans.to_json()?);
//! ```

pub mod alias;
pub mod context;
pub mod plan;
pub mod post_steps;
pub mod preflight;
pub mod resolver;
pub mod rules;
pub mod target;

pub use alias::*;
pub use context::*;
pub use plan::*;
pub use post_steps::*;
pub use preflight::*;
pub use resolver::*;
pub use rules::*;
pub use target::*;
