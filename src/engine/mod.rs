//! Sublet lifecycle engine
//!
//! Orchestrates every user-facing operation over the two caches, the
//! archive codec, the repository gateway and the host notifier.
//!
//! Per sublet name the engine moves between two states:
//!
//! ```text
//! NotInstalled --install--> Installed --uninstall--> NotInstalled
//! Installed(old) --upgrade (uninstall, install)--> Installed(new)
//! ```

mod reorder;
mod upgrade;

pub use reorder::{parse_order, ReorderEntry, ReorderReport};
pub use upgrade::{plan_upgrades, UpgradeCandidate, UpgradeReport};

use crate::archive::{self, BuiltPackage, Extraction};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{AnnotateRejection, Repository, SubmitRejection, SurError, SurResult};
use crate::gateway::{Gateway, HttpGateway, NoProgress, TransferProgress};
use crate::host::{CommandNotifier, HostNotifier};
use crate::layout::Layout;
use crate::matcher::{Matcher, Query};
use crate::spec::{basename, Specification, PACKAGE_EXTENSION};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Options for [`Engine::install`]
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Only install this exact version
    pub version: Option<String>,
    /// Also match the name against tags
    pub use_tags: bool,
    /// Ask the host to reload afterwards
    pub reload: bool,
}

/// Options for [`Engine::uninstall`]
#[derive(Debug, Clone, Default)]
pub struct UninstallOptions {
    pub version: Option<String>,
    pub use_tags: bool,
    pub reload: bool,
}

/// Outcome of a host reload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadStatus {
    /// No reload was requested
    Skipped,
    /// The host reloaded its sublets
    Done,
    /// The host could not be notified; the operation itself succeeded
    Failed(String),
}

/// Result of a successful install
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub spec: Specification,
    pub files: Vec<PathBuf>,
    pub reload: ReloadStatus,
}

/// Result of an uninstall
///
/// Removal failures do not abort the uninstall; they are collected here.
#[derive(Debug, Clone)]
pub struct UninstallReport {
    pub spec: Specification,
    pub removed: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
    pub reload: ReloadStatus,
}

impl UninstallReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Package lifecycle engine
pub struct Engine {
    layout: Layout,
    cache: CacheStore,
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn HostNotifier>,
    progress: Arc<dyn TransferProgress>,
    user: String,
}

impl Engine {
    /// Create an engine from explicit collaborators
    pub fn new(
        layout: Layout,
        max_remote_age: Duration,
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn HostNotifier>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            cache: CacheStore::new(layout.clone(), max_remote_age),
            layout,
            gateway,
            notifier,
            progress: Arc::new(NoProgress),
            user: user.into(),
        }
    }

    /// Create an engine speaking HTTP to the configured repository
    pub fn from_config(config: &Config) -> Self {
        let gateway = HttpGateway::new(
            &config.repository.url,
            Duration::from_secs(config.repository.timeout_secs),
        );
        let notifier = CommandNotifier::new(config.host.reload_command.clone());
        let max_age = Duration::from_secs(u64::from(config.cache.remote_max_age_hours) * 3600);

        Self::new(
            Layout::from_config(config),
            max_age,
            Arc::new(gateway),
            Arc::new(notifier),
            config.repository.acting_user(),
        )
    }

    /// Report transfers to `progress`
    pub fn with_progress(mut self, progress: Arc<dyn TransferProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Install a sublet by name, or directly from a package file
    pub async fn install(
        &mut self,
        name: &str,
        options: &InstallOptions,
    ) -> SurResult<InstallReport> {
        let matcher = Matcher::new(
            &Query::name(name)
                .with_version(options.version.clone())
                .with_tags(options.use_tags),
        )?;

        if !matcher.search(self.cache.local().await?).is_empty() {
            return Err(SurError::AlreadyInstalled(name.to_string()));
        }

        let package = Path::new(name);
        if package.is_file() {
            info!("Installing from {}", package.display());
            let (spec, files) = self.install_package(package).await?;
            let reload = self.reload(options.reload).await;
            return Ok(InstallReport {
                spec,
                files,
                reload,
            });
        }

        let spec = matcher
            .search(self.cache.remote(self.gateway.as_ref()).await?)
            .into_iter()
            .next()
            .ok_or_else(|| SurError::NotFound {
                name: name.to_string(),
                version: options.version.clone(),
                repository: Repository::Remote,
            })?;

        let missing = spec.missing_dependencies();
        if !missing.is_empty() {
            return Err(SurError::UnsatisfiedDependency {
                name: spec.name.clone(),
                missing,
            });
        }

        let digest = spec
            .digest
            .as_deref()
            .ok_or_else(|| SurError::remote("fetch", format!("no digest listed for {}", spec)))?;

        let temp = tempfile::Builder::new()
            .prefix("sur-")
            .suffix(&format!(".{}", PACKAGE_EXTENSION))
            .tempfile()
            .map_err(|e| SurError::io("creating download file", e))?;

        self.progress
            .start(&format!("Fetching sublet {}", spec), None);
        let fetched = self
            .gateway
            .fetch(digest, temp.path(), self.progress.clone())
            .await;
        self.progress.finish();
        let size = fetched?;
        debug!("Fetched {} bytes for {}", size, spec);

        let (spec, files) = self.install_package(temp.path()).await?;
        let reload = self.reload(options.reload).await;

        Ok(InstallReport {
            spec,
            files,
            reload,
        })
    }

    /// Extract a package and refresh the local cache
    async fn install_package(&mut self, package: &Path) -> SurResult<(Specification, Vec<PathBuf>)> {
        match archive::extract(package, &self.layout)? {
            Extraction::Installed { spec, files } => {
                info!("Installed sublet {}", spec);
                self.cache.rebuild_local().await?;
                Ok((spec, files))
            }
            Extraction::Unsatisfied { spec, missing } => Err(SurError::UnsatisfiedDependency {
                name: spec.name,
                missing,
            }),
        }
    }

    /// Remove an installed sublet
    pub async fn uninstall(
        &mut self,
        name: &str,
        options: &UninstallOptions,
    ) -> SurResult<UninstallReport> {
        let matcher = Matcher::new(
            &Query::name(name)
                .with_version(options.version.clone())
                .with_tags(options.use_tags),
        )?;

        let spec = matcher
            .search(self.cache.local().await?)
            .into_iter()
            .next()
            .ok_or_else(|| SurError::NotFound {
                name: name.to_string(),
                version: options.version.clone(),
                repository: Repository::Local,
            })?;

        let mut targets = installed_files(&self.layout.sublets_dir(), &spec).await?;
        for icon in &spec.icons {
            targets.push(self.layout.icons_dir().join(basename(icon)));
        }
        targets.push(
            spec.path
                .clone()
                .unwrap_or_else(|| self.layout.specs_dir().join(spec.spec_file_name())),
        );

        let mut removed = Vec::new();
        let mut failures = Vec::new();
        for target in targets {
            match tokio::fs::remove_file(&target).await {
                Ok(()) => {
                    debug!("Removed {}", target.display());
                    removed.push(target);
                }
                Err(e) => {
                    warn!("Couldn't remove {}: {}", target.display(), e);
                    failures.push((target, e.to_string()));
                }
            }
        }

        info!("Uninstalled sublet {}", spec);
        self.cache.rebuild_local().await?;
        let reload = self.reload(options.reload).await;

        Ok(UninstallReport {
            spec,
            removed,
            failures,
            reload,
        })
    }

    /// Package a specification and its files into `out_dir`
    pub async fn build(&self, spec_file: &Path, out_dir: &Path) -> SurResult<BuiltPackage> {
        let spec = Specification::from_file(spec_file).await?;

        let diagnostics = spec.validate();
        if !diagnostics.is_empty() {
            return Err(SurError::InvalidSpecification {
                path: spec_file.to_path_buf(),
                diagnostics,
            });
        }

        archive::build(&spec, spec_file, out_dir)
    }

    /// Upload a package to the repository
    pub async fn submit(&mut self, package: &Path) -> SurResult<Specification> {
        let is_package = package.is_file()
            && package
                .extension()
                .is_some_and(|ext| ext == PACKAGE_EXTENSION);
        if !is_package {
            return Err(SurError::NotAPackage(package.to_path_buf()));
        }

        let spec = archive::read(package)?.spec;
        let diagnostics = spec.validate();
        if !diagnostics.is_empty() {
            return Err(SurError::InvalidSpecification {
                path: package.to_path_buf(),
                diagnostics,
            });
        }

        self.progress
            .start(&format!("Submitting sublet {}", spec), None);
        let status = self
            .gateway
            .submit(package, &self.user, self.progress.clone())
            .await;
        self.progress.finish();

        match status? {
            200 => {
                info!("Submitted sublet {}", spec);
                self.cache.rebuild_remote(self.gateway.as_ref()).await?;
                Ok(spec)
            }
            other => Err(SurError::SubmitRejected(SubmitRejection::from_status(other))),
        }
    }

    /// Mark a repository sublet for review
    pub async fn annotate(&mut self, name: &str, version: Option<String>) -> SurResult<Specification> {
        let query = Query::name(name).with_version(version.clone());
        let spec = Matcher::new(&query)?
            .search(self.cache.remote(self.gateway.as_ref()).await?)
            .into_iter()
            .next()
            .ok_or_else(|| SurError::NotFound {
                name: name.to_string(),
                version,
                repository: Repository::Remote,
            })?;

        let digest = spec
            .digest
            .as_deref()
            .ok_or_else(|| SurError::remote("annotate", format!("no digest listed for {}", spec)))?;

        match self.gateway.annotate(digest, &self.user).await? {
            200 => {
                info!("Annotated sublet {}", spec);
                Ok(spec)
            }
            other => Err(SurError::AnnotateRejected(AnnotateRejection::from_status(
                other,
            ))),
        }
    }

    /// Notes of an installed sublet, if it has any
    pub async fn notes(&mut self, name: &str) -> SurResult<Option<String>> {
        let spec = Matcher::new(&Query::name(name))?
            .search(self.cache.local().await?)
            .into_iter()
            .next()
            .ok_or_else(|| SurError::NotFound {
                name: name.to_string(),
                version: None,
                repository: Repository::Local,
            })?;

        Ok(spec.notes().map(str::to_string))
    }

    /// Search a cache; an empty result is an error here
    pub async fn query(
        &mut self,
        query: &Query,
        repository: Repository,
    ) -> SurResult<Vec<Specification>> {
        let matcher = Matcher::new(query)?;
        let found = matcher.search(self.cache.get(repository, self.gateway.as_ref()).await?);

        if found.is_empty() {
            return Err(SurError::NotFound {
                name: query.text.clone(),
                version: query.version.clone(),
                repository,
            });
        }

        Ok(found)
    }

    /// Every entry of a cache
    pub async fn list(&mut self, repository: Repository) -> SurResult<Vec<Specification>> {
        Ok(self
            .cache
            .get(repository, self.gateway.as_ref())
            .await?
            .to_vec())
    }

    /// Version of the first installed sublet called `name`
    pub async fn installed_version(&mut self, name: &str) -> SurResult<Option<String>> {
        Ok(self
            .cache
            .local()
            .await?
            .iter()
            .find(|s| s.same_name(name))
            .map(|s| s.version.clone()))
    }

    /// Rebuild a cache, returning its new size
    pub async fn update(&mut self, repository: Repository) -> SurResult<usize> {
        Ok(self
            .cache
            .rebuild(repository, self.gateway.as_ref())
            .await?
            .len())
    }

    /// Ask the host to reload when requested
    async fn reload(&self, requested: bool) -> ReloadStatus {
        if !requested {
            return ReloadStatus::Skipped;
        }

        match self.notifier.reload_packages().await {
            Ok(()) => ReloadStatus::Done,
            Err(e) => {
                warn!("{}", e);
                ReloadStatus::Failed(e.to_string())
            }
        }
    }
}

/// Whether `file_name` in the sublet directory is an installed copy of
/// the declared file `declared`
///
/// Reordered files carry a `<digits>_` prefix in front of either the
/// declared basename or the lowercased sublet name.
pub(crate) fn is_installed_copy(file_name: &str, declared: &str, spec_name: &str) -> bool {
    let base = basename(declared);
    if file_name == base {
        return true;
    }

    let renamed = match Path::new(base).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", spec_name.to_lowercase(), ext),
        None => spec_name.to_lowercase(),
    };

    [base, renamed.as_str()].iter().any(|target| {
        file_name
            .strip_suffix(target)
            .is_some_and(|prefix| is_order_prefix(prefix))
    })
}

/// `10_`, `1_2_` and the like
fn is_order_prefix(prefix: &str) -> bool {
    prefix.ends_with('_') && prefix.chars().all(|c| c.is_ascii_digit() || c == '_')
}

/// Files in the sublet directory that belong to `spec`
async fn installed_files(dir: &Path, spec: &Specification) -> SurResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.exists() {
        return Ok(files);
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| SurError::io(format!("reading {}", dir.display()), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SurError::io("reading sublet entry", e))?
    {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if spec
            .files
            .iter()
            .any(|declared| is_installed_copy(&file_name, declared, &spec.name))
        {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}
