//! Configuration management for sur

pub mod schema;

pub use schema::Config;

use crate::error::{SurError, SurResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

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

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sur")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub async fn load(&self) -> SurResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> SurResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SurError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| SurError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read the raw config document, or an empty one if the file is missing
    pub async fn load_document(&self) -> SurResult<toml_edit::DocumentMut> {
        if !self.config_path.exists() {
            return Ok(toml_edit::DocumentMut::new());
        }

        let content = fs::read_to_string(&self.config_path).await.map_err(|e| {
            SurError::io(
                format!("reading config from {}", self.config_path.display()),
                e,
            )
        })?;

        content
            .parse::<toml_edit::DocumentMut>()
            .map_err(|e| SurError::ConfigInvalid {
                path: self.config_path.clone(),
                reason: e.to_string(),
            })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> SurResult<()> {
        let content = toml::to_string_pretty(config)?;
        self.write(&content).await
    }

    /// Save an edited document, keeping the user's comments and layout
    pub async fn save_document(&self, doc: &toml_edit::DocumentMut) -> SurResult<()> {
        // Reject edits that would no longer load
        toml::from_str::<Config>(&doc.to_string()).map_err(|e| SurError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })?;
        self.write(&doc.to_string()).await
    }

    async fn write(&self, content: &str) -> SurResult<()> {
        self.ensure_config_dir().await?;

        fs::write(&self.config_path, content).await.map_err(|e| {
            SurError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> SurResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SurError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
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
