//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use orquideas_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Picked up from the working directory when no file is given
pub const DEFAULT_CONFIG_FILE: &str = "orquideas.toml";

/// The config file in effect: the explicit one, else `./orquideas.toml` if it exists
pub fn resolve_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}

/// Load layered configuration: defaults, then file, then environment
pub fn load_config(config_file: Option<&Path>) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_file {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides and validate the result
pub fn load_config_with_overrides(
    config_file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_config(config_file)?;
    config.update_from_cli(overrides);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
