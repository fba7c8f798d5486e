//! Configuration loading from file system

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::DEFAULT_CONFIG_PATH;
use super::types::Config;
use crate::error::{Result, StudioError};

/// Load configuration from ~/.blueprint-studio/config.json
pub fn load_config() -> Config {
    let path = PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref());
    load_config_from(&path)
}

/// Load configuration from `path`.
///
/// Returns Config::default() if the file is missing or unreadable or invalid.
#[instrument(name = "load_config", skip_all, fields(path = %path.display()))]
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(error = %e, "Failed to read config file, using defaults");
            return Config::default();
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            info!("Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(error = %e, "Failed to parse config JSON, using defaults");
            Config::default()
        }
    }
}

/// Parse config JSON
pub fn parse_config(contents: &str) -> Result<Config> {
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_json::from_str(contents).map_err(|e| StudioError::Config(e.to_string()))
}
