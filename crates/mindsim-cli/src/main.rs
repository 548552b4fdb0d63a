//! # mindsim - command-line driver for the spiking network simulator
//!
//! Runs the simulation engine on a worker thread, paces tick requests, and
//! reports aggregate cognition signals as the network evolves.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mindsim_cli::{error::CliResult, MindsimCli};

#[tokio::main]
async fn main() -> CliResult<()> {
    // Parse CLI arguments
    let cli = MindsimCli::parse();

    // RUST_LOG wins over --verbose; runtime `log` records are bridged in by init()
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute the command
    if let Err(err) = cli.execute().await {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }

    Ok(())
}
