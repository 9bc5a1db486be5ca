//! Binary crate for the `weather-mcp` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use weather_core::WeatherError;

mod cli;
mod output;

const EXIT_FAILURE: u8 = 1;
/// Exit status for queries rejected because of bad input.
const EXIT_INVALID_INPUT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);

    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "weather_core=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Input errors exit with 2, like clap's usage errors; everything else
/// exits with 1.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<WeatherError>() {
        Some(e) if e.is_input_error() => EXIT_INVALID_INPUT,
        _ => EXIT_FAILURE,
    }
}
