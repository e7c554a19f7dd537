//! Configuration service implementation.
//!
//! Loads `config.toml`, falling back to defaults when the file is absent.

use crate::paths::EmpathPaths;
use crate::storage::ConfigStorage;
use anyhow::{Context, Result};
use empath_core::config::AppConfig;
use tracing::{debug, info};

/// Loads the application configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: EmpathPaths,
}

impl ConfigService {
    pub fn new(paths: EmpathPaths) -> Self {
        Self { paths }
    }

    /// Loads `config.toml`; a missing or empty file yields `AppConfig::default()`.
    ///
    /// A malformed file is an error rather than silently ignored.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self
            .paths
            .config_file()
            .context("Failed to resolve config.toml path")?;
        let storage = ConfigStorage::new(path);

        match storage
            .load()
            .with_context(|| format!("Failed to load {}", storage.path().display()))?
        {
            Some(config) => {
                info!("Loaded configuration from {}", storage.path().display());
                Ok(config)
            }
            None => {
                debug!("No config.toml found, using defaults");
                Ok(AppConfig::default())
            }
        }
    }
}
