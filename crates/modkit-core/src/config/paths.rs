//! Config path resolution helpers.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "MODKIT_CONFIG";

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join("modkit").join("modkit.toml"))
}
