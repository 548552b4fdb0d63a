//! Configuration management for the mindsim CLI

use std::path::{Path, PathBuf};

use mindsim_runtime::SimulationConfig;
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

/// Load a simulation configuration from a TOML file
///
/// Missing sections and keys fall back to their defaults.
pub fn load_from_file(path: &Path) -> CliResult<SimulationConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: SimulationConfig =
        toml::from_str(&content).map_err(|e| CliError::config(format!("Invalid config file {}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Save a simulation configuration as TOML
pub fn save_to_file(config: &SimulationConfig, path: &Path) -> CliResult<()> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, content)?;
    Ok(())
}

/// Get the default configuration file path
pub fn default_config_path() -> CliResult<PathBuf> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| CliError::config("Could not determine config directory"))?;
    Ok(config_dir.join("mindsim").join("config.toml"))
}

/// Pick the configuration for a command
///
/// An explicit path must exist. Without one, the default path is used when
/// present, and built-in defaults otherwise.
pub fn resolve(explicit: Option<&Path>) -> CliResult<SimulationConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(CliError::missing_resource(format!("config file {}", path.display())));
        }
        info!("Using configuration {}", path.display());
        return load_from_file(path);
    }

    match default_config_path() {
        Ok(path) if path.exists() => {
            info!("Using configuration {}", path.display());
            load_from_file(&path)
        }
        _ => {
            debug!("No configuration file found, using defaults");
            Ok(SimulationConfig::default())
        }
    }
}
