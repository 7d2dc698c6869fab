//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `link_status` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Report rendering and the process exit code
//!
//! All core functionality is implemented in the library crate.

use clap::Parser;
use std::process;

use link_status::initialization::init_logger_with;
use link_status::report::write_report;
use link_status::{run_check, Config};

// Exit codes: 0 = all ok (or only warnings), 1 = broken links found,
// 2 = configuration error or unreachable seed.
#[tokio::main]
async fn main() {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    if let Err(e) = init_logger_with(log_level.into(), log_format) {
        eprintln!("link_status error: failed to initialize logger: {e}");
        process::exit(2);
    }

    let exit_code = match run_check(config.clone()).await {
        Ok(report) => match write_report(&report, &config.format, config.output.as_deref()) {
            Ok(()) => report.exit_code(),
            Err(e) => {
                eprintln!("link_status error: {e:#}");
                2
            }
        },
        Err(e) => {
            eprintln!("link_status error: {e:#}");
            2
        }
    };

    process::exit(exit_code);
}
