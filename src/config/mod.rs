//! Configuration management for vcpkg-cache

pub mod schema;

pub use schema::Config;

use crate::error::{VcpkgError, VcpkgResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Workspace-local config file name
pub const LOCAL_CONFIG_FILE: &str = "vcpkg-cache.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Pick the config file: workspace-local if present, else the user default
    pub fn discover(workspace: &Path) -> Self {
        let local = workspace.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            debug!("Found local config: {}", local.display());
            Self::with_path(local)
        } else {
            Self::new()
        }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vcpkg-cache")
            .join("config.toml")
    }

    /// Default local store directory
    pub fn default_store_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("vcpkg-cache")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> VcpkgResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> VcpkgResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| VcpkgError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| VcpkgError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
