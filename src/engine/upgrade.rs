//! Upgrade planning and application

use super::{Engine, InstallOptions, ReloadStatus, UninstallOptions};
use crate::error::SurResult;
use crate::spec::Specification;
use tracing::info;

/// An installed sublet and the newer version that replaces it
#[derive(Debug, Clone)]
pub struct UpgradeCandidate {
    pub installed: Specification,
    pub available: Specification,
}

/// Result of applying an upgrade plan
#[derive(Debug, Clone)]
pub struct UpgradeReport {
    pub upgraded: Vec<Specification>,
    pub reload: ReloadStatus,
}

/// Pair every installed sublet with its upgrade, if any
///
/// The candidate is the first remote entry, in cache order, with the same
/// name and a strictly greater numeric version. Because the remote cache
/// is sorted as strings this is not necessarily the newest version.
pub fn plan_upgrades(local: &[Specification], remote: &[Specification]) -> Vec<UpgradeCandidate> {
    local
        .iter()
        .filter_map(|installed| {
            remote
                .iter()
                .find(|available| {
                    available.same_name(&installed.name)
                        && installed.numeric_version() < available.numeric_version()
                })
                .map(|available| UpgradeCandidate {
                    installed: installed.clone(),
                    available: available.clone(),
                })
        })
        .collect()
}

impl Engine {
    /// Refresh the remote cache and work out what can be upgraded
    pub async fn plan_upgrade(&mut self) -> SurResult<Vec<UpgradeCandidate>> {
        let remote = self
            .cache
            .rebuild_remote(self.gateway.as_ref())
            .await?
            .to_vec();
        let local = self.cache.local().await?;

        Ok(plan_upgrades(local, &remote))
    }

    /// Replace each planned sublet with its candidate, in plan order
    ///
    /// The host is reloaded once at the end, if requested.
    pub async fn apply_upgrade(
        &mut self,
        plan: &[UpgradeCandidate],
        reload: bool,
    ) -> SurResult<UpgradeReport> {
        let mut upgraded = Vec::new();

        for candidate in plan {
            info!(
                "Upgrading {}: {} -> {}",
                candidate.installed.name, candidate.installed.version, candidate.available.version
            );

            self.uninstall(
                &candidate.installed.name,
                &UninstallOptions {
                    version: Some(candidate.installed.version.clone()),
                    ..UninstallOptions::default()
                },
            )
            .await?;

            let report = self
                .install(
                    &candidate.available.name,
                    &InstallOptions {
                        version: Some(candidate.available.version.clone()),
                        ..InstallOptions::default()
                    },
                )
                .await?;
            upgraded.push(report.spec);
        }

        let reload = if upgraded.is_empty() {
            ReloadStatus::Skipped
        } else {
            self.reload(reload).await
        };

        Ok(UpgradeReport { upgraded, reload })
    }
}
