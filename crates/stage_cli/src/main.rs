//! terrastage CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success (no stage failed)
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Staging failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod stage;

use cli::Cli;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const STAGING_FAILURE: u8 = 3;
}

const CRATES: &[&str] = &["stage_cli", "stage_core", "stage_iac", "stage_config"];

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match stage::execute(&cli) {
        Ok(report) if report.has_failures() => ExitCode::from(ExitCodes::STAGING_FAILURE),
        Ok(_) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Install the global subscriber; `RUST_LOG` replaces the default filter.
fn init_logging(cli: &Cli) {
    let level = if cli.debug_logging() { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let log_result = tracing_subscriber::registry()
        .with(filter)
        .with(cli.log_json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!cli.log_json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr)))
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

fn default_directives(level: &str) -> String {
    let mut directives: Vec<String> = CRATES.iter().map(|c| format!("{}={}", c, level)).collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    let msg = e.to_string().to_lowercase();

    if msg.contains("not found") || msg.contains("argument") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
