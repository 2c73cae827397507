//! Filesystem layout for snapshots and installed sublets
//!
//! ```text
//! <cache>/local.yaml        installed snapshot
//! <cache>/remote.yaml       repository snapshot
//! <data>/icons/             installed icons (*.xbm)
//! <data>/specifications/    installed specifications (<name>-<version>.spec)
//! <data>/sublets/           installed sublet files
//! ```

use crate::config::Config;
use std::path::PathBuf;

/// Resolved directories used by the cache store and the archive codec
#[derive(Debug, Clone)]
pub struct Layout {
    cache_dir: PathBuf,
    data_dir: PathBuf,
}

impl Layout {
    /// Create a layout rooted at explicit directories
    pub fn new(cache_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Derive the layout from config, falling back to XDG locations
    pub fn from_config(config: &Config) -> Self {
        let cache_dir = config.paths.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("sur")
        });
        let data_dir = config.paths.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("subtle")
        });

        Self::new(cache_dir, data_dir)
    }

    /// Snapshot of installed specifications
    pub fn local_snapshot(&self) -> PathBuf {
        self.cache_dir.join("local.yaml")
    }

    /// Snapshot of repository specifications
    pub fn remote_snapshot(&self) -> PathBuf {
        self.cache_dir.join("remote.yaml")
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.data_dir.join("icons")
    }

    pub fn specs_dir(&self) -> PathBuf {
        self.data_dir.join("specifications")
    }

    pub fn sublets_dir(&self) -> PathBuf {
        self.data_dir.join("sublets")
    }
}
