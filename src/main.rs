//! bundleplan - Command-line tool for resolving bundler build plans

use std::process::ExitCode;

use bundleplan::cli;

fn main() -> ExitCode {
    cli::run()
}
