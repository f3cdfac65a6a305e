//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout carries nothing but the plan document.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter (e.g. `bundleplan=trace`).
pub const LOG_ENV: &str = "BUNDLEPLAN_LOG";

/// Default filter directive for a verbosity setting.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "bundleplan=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber.
///
/// `BUNDLEPLAN_LOG` wins over the verbosity flag. Calling this twice is
/// harmless; the second call is ignored.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
