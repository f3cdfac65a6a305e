//! bundleplan - build plan resolution for multi-target front-end bundles
//!
//! This library provides functionality to:
//! - Load a `bundle.toml` catalog of view-component targets
//! - Read the development/production flag from the environment
//! - Resolve one immutable bundler configuration per target
//! - Verify entry and shared-alias files before a build starts

pub mod build;
pub mod cli;
pub mod config;
pub mod env;
pub mod logging;
