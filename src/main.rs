//! Binary entry point: load configuration, run the ring, map fatal errors
//! to exit codes.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use log::{error, info};

use ringlife::config::Config;
use ringlife::error::RunError;
use ringlife::orchestrator;

/// Exit code for a startup configuration failure.
const EXIT_CONFIGURATION: u8 = 2;
/// Exit code for an unrecovered communication failure.
const EXIT_COMMUNICATION: u8 = 3;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Snapshots emitted for prior steps stay on disk.
            error!("fatal: {:#}", err);
            match err.downcast_ref::<RunError>() {
                Some(RunError::Configuration(_)) => ExitCode::from(EXIT_CONFIGURATION),
                Some(RunError::Communication { .. }) => ExitCode::from(EXIT_COMMUNICATION),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn try_main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(Path::new(&path))
            .with_context(|| format!("loading configuration from {}", path))?,
        None => {
            info!("no configuration file given, using defaults");
            Config::default()
        }
    };

    orchestrator::run(&config).context("simulation run failed")?;
    info!("run completed successfully");
    Ok(())
}
