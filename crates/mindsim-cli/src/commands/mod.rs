//! CLI command implementations for mindsim

use clap::{Parser, Subcommand};

use crate::error::CliResult;

pub mod init;
pub mod inspect;
pub mod run;

/// mindsim - region-partitioned spiking network simulator
#[derive(Parser, Debug)]
#[command(
    name = "mindsim",
    version,
    about = "Didactic spiking network simulator with emergent cognition signals",
    long_about = "mindsim grows a small spiking network split into functional regions and \
                  derives emotions, attention, consciousness and fleeting thoughts from its \
                  activity. Run it, poke it, damage regions and export snapshots."
)]
pub struct MindsimCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MINDSIM_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the simulation
    Run(run::RunCommand),

    /// Write the default configuration file
    Init(init::InitCommand),

    /// Summarise a generated network or an exported snapshot
    Inspect(inspect::InspectCommand),
}

impl MindsimCli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        let config = self.config;

        match self.command {
            Commands::Run(cmd) => cmd.execute(config).await,
            Commands::Init(cmd) => cmd.execute(config).await,
            Commands::Inspect(cmd) => cmd.execute(config).await,
        }
    }
}
