//! Config store for loading modkit.toml.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::paths::{CONFIG_ENV, default_config_path};
use super::schema::ModkitConfig;
use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
    /// Explicitly requested files must exist
    required: bool,
}

impl ConfigStore {
    /// Store for an explicitly chosen file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            required: true,
        }
    }

    /// Store for `$MODKIT_CONFIG`, falling back to the per-user config file.
    pub fn from_env_or_default() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Ok(Self::from_path(path)),
            _ => Ok(Self {
                config_path: default_config_path()?,
                required: false,
            }),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<ModkitConfig, ConfigError> {
        if !self.required && !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(ModkitConfig::new());
        }

        let content =
            std::fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Read {
                path: self.config_path.clone(),
                source,
            })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.config_path.clone(),
            source,
        })?;
        debug!(path = %self.config_path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let store = ConfigStore::from_path(tmp.path().join("modkit.toml"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn loads_required_apis() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let path = tmp.path().join("modkit.toml");
        std::fs::write(
            &path,
            "[required_apis]\n\"/modules/x/y\" = [\"a.googleapis.com\"]\n",
        )
        .expect("write should succeed");

        let config = ConfigStore::from_path(&path)
            .load()
            .expect("load should succeed");
        assert_eq!(
            config.required_apis.get("/modules/x/y"),
            Some(&vec!["a.googleapis.com".to_string()])
        );
    }

    #[test]
    fn malformed_file_reports_path() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let path = tmp.path().join("modkit.toml");
        std::fs::write(&path, "required_apis = 3\n").expect("write should succeed");

        let err = ConfigStore::from_path(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("modkit.toml"));
    }
}
