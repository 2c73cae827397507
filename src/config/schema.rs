//! Configuration schema for sur
//!
//! Configuration is stored at `~/.config/sur/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Remote repository settings
    pub repository: RepositoryConfig,

    /// Directory overrides
    pub paths: PathsConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Host window manager settings
    pub host: HostConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Colorize listings
    pub color: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            color: true,
            log_format: "text".to_string(),
        }
    }
}

/// Remote repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Base URL of the repository server
    pub url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User name sent with submissions and annotations (defaults to $USER)
    pub user: Option<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: "http://sur.subtle.de".to_string(),
            timeout_secs: 30,
            user: None,
        }
    }
}

impl RepositoryConfig {
    /// Resolve the acting user name
    pub fn acting_user(&self) -> String {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

/// Directory overrides; unset entries fall back to XDG locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Holds the `local.yaml` and `remote.yaml` snapshots
    pub cache_dir: Option<PathBuf>,

    /// Holds `icons/`, `specifications/` and `sublets/`
    pub data_dir: Option<PathBuf>,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Refresh the remote snapshot once it is older than N hours
    pub remote_max_age_hours: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            remote_max_age_hours: 24,
        }
    }
}

/// Host window manager settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Command that makes the host reload its sublets
    pub reload_command: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            reload_command: vec!["subtler".to_string(), "-r".to_string()],
        }
    }
}
