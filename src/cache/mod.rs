//! Local and remote specification caches
//!
//! The local cache lists installed sublets and is built by scanning the
//! specification directory. The remote cache lists what the repository
//! offers and is built from the gateway's list endpoint.
//!
//! # Lifecycle
//!
//! | Cache  | First use                                  | Rebuild trigger              |
//! |--------|--------------------------------------------|------------------------------|
//! | Local  | snapshot if present, else scan             | install, uninstall, reorder  |
//! | Remote | snapshot if younger than max age, else list | update, upgrade, submit      |
//!
//! Both caches are sorted by `(name, version)` and persisted after
//! every rebuild. A rebuild replaces the whole cache.

pub mod snapshot;

use crate::error::{Repository, SurError, SurResult};
use crate::gateway::Gateway;
use crate::layout::Layout;
use crate::spec::{sort_specs, Specification};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Holder of both caches, loaded lazily
pub struct CacheStore {
    layout: Layout,
    max_remote_age: Duration,
    local: Option<Vec<Specification>>,
    remote: Option<Vec<Specification>>,
}

impl CacheStore {
    /// Create an empty store; nothing is read until first use
    pub fn new(layout: Layout, max_remote_age: Duration) -> Self {
        Self {
            layout,
            max_remote_age,
            local: None,
            remote: None,
        }
    }

    /// Installed specifications, loading or building them on first use
    pub async fn local(&mut self) -> SurResult<&[Specification]> {
        if self.local.is_none() {
            let path = self.layout.local_snapshot();
            match load_snapshot(&path) {
                Some(specs) => {
                    debug!("Loaded local cache with {} entries", specs.len());
                    self.local = Some(specs);
                }
                None => {
                    self.rebuild_local().await?;
                }
            }
        }

        Ok(self.local.as_deref().unwrap_or_default())
    }

    /// Available specifications, loading or fetching them on first use
    pub async fn remote(&mut self, gateway: &dyn Gateway) -> SurResult<&[Specification]> {
        if self.remote.is_none() {
            let path = self.layout.remote_snapshot();
            let fresh = snapshot::age(&path).is_some_and(|age| age < self.max_remote_age);

            let loaded = if fresh { load_snapshot(&path) } else { None };
            match loaded {
                Some(specs) => {
                    debug!("Loaded remote cache with {} entries", specs.len());
                    self.remote = Some(specs);
                }
                None => {
                    debug!("Remote cache missing or stale");
                    self.rebuild_remote(gateway).await?;
                }
            }
        }

        Ok(self.remote.as_deref().unwrap_or_default())
    }

    /// Rescan the specification directory and persist the result
    pub async fn rebuild_local(&mut self) -> SurResult<&[Specification]> {
        let mut specs = scan_specs(&self.layout).await?;
        sort_specs(&mut specs);

        snapshot::write(&self.layout.local_snapshot(), &specs)?;
        info!("Updated local cache with {} entries", specs.len());

        Ok(self.local.insert(specs).as_slice())
    }

    /// Fetch the repository list and persist the result
    pub async fn rebuild_remote(&mut self, gateway: &dyn Gateway) -> SurResult<&[Specification]> {
        let mut specs = gateway.list().await?;
        sort_specs(&mut specs);

        snapshot::write(&self.layout.remote_snapshot(), &specs)?;
        info!("Updated remote cache with {} entries", specs.len());

        Ok(self.remote.insert(specs).as_slice())
    }

    /// Load or build the cache for `repository`
    pub async fn get(
        &mut self,
        repository: Repository,
        gateway: &dyn Gateway,
    ) -> SurResult<&[Specification]> {
        match repository {
            Repository::Local => self.local().await,
            Repository::Remote => self.remote(gateway).await,
        }
    }

    /// Rebuild the cache for `repository`
    pub async fn rebuild(
        &mut self,
        repository: Repository,
        gateway: &dyn Gateway,
    ) -> SurResult<&[Specification]> {
        match repository {
            Repository::Local => self.rebuild_local().await,
            Repository::Remote => self.rebuild_remote(gateway).await,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

/// Read a snapshot, treating unreadable ones as absent
fn load_snapshot(path: &std::path::Path) -> Option<Vec<Specification>> {
    match snapshot::read(path) {
        Ok(specs) => specs,
        Err(e) => {
            warn!("Ignoring unreadable cache {}: {}", path.display(), e);
            None
        }
    }
}

/// Parse every valid specification in the specification directory
async fn scan_specs(layout: &Layout) -> SurResult<Vec<Specification>> {
    let dir = layout.specs_dir();
    let mut specs = Vec::new();

    if !dir.exists() {
        return Ok(specs);
    }

    let mut entries = tokio::fs::read_dir(&dir)
        .await
        .map_err(|e| SurError::io(format!("reading {}", dir.display()), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SurError::io("reading specification entry", e))?
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        match Specification::from_file(&path).await {
            Ok(mut spec) => {
                let problems = spec.validate();
                if problems.is_empty() {
                    spec.path = Some(path);
                    specs.push(spec);
                } else {
                    warn!(
                        "Skipping invalid specification {}: {}",
                        path.display(),
                        problems.join("; ")
                    );
                }
            }
            Err(e) => warn!("Couldn't parse specification {}: {}", path.display(), e),
        }
    }

    Ok(specs)
}
