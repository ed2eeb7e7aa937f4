//! ADHD Predictor - Main Entry Point
//!
//! Loads the training artifacts once, then serves the form, a one-shot
//! prediction, or an artifact check.

mod api;
mod constants;
mod logic;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use api::cli::{self, Cli};

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Single stderr line for a fatal error, with its context chain
fn report_failure<W: Write>(out: &mut W, err: &anyhow::Error) {
    let _ = writeln!(out, "error: {:#}", err);
}

fn main() -> ExitCode {
    // .env is optional
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Ok(path) = dotenv {
        log::debug!("Loaded environment from {}", path.display());
    }

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&mut io::stderr(), &e);
            ExitCode::FAILURE
        }
    }
}
