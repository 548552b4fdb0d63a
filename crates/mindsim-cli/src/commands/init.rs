//! Configuration initialization command

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use mindsim_runtime::SimulationConfig;

use crate::{
    config,
    error::{CliError, CliResult},
};

/// Write the default configuration file
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Where to write (defaults to --config, then the user config directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fix the random seed in the written file
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> CliResult<()> {
        let path = match self.output.or(config_path) {
            Some(path) => path,
            None => config::default_config_path()?,
        };

        if path.exists() && !self.force {
            return Err(CliError::invalid_args(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        let mut simulation = SimulationConfig::default();
        simulation.seed = self.seed;
        config::save_to_file(&simulation, &path)?;

        info!("Wrote default configuration to {}", path.display());
        println!("{}", path.display());
        Ok(())
    }
}
