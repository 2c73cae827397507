//! Load order of installed sublet files
//!
//! The host loads sublet files in directory order, so a numeric prefix
//! decides which sublet comes first.

use super::{is_installed_copy, Engine};
use crate::error::{SurError, SurResult};
use std::path::Path;
use tracing::{debug, info, warn};

/// An installed sublet file that can be reordered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderEntry {
    /// Display name of the owning sublet
    pub sublet: String,
    /// Version of the owning sublet
    pub version: String,
    /// Current file name in the sublet directory
    pub file: String,
}

impl ReorderEntry {
    /// Name the file gets at `position` (1-based)
    pub fn target_name(&self, position: usize) -> String {
        let name = self.sublet.to_lowercase();
        match Path::new(&self.file).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}_{}.{}", position * 10, name, ext),
            None => format!("{}_{}", position * 10, name),
        }
    }
}

/// Result of applying a new order
#[derive(Debug, Clone, Default)]
pub struct ReorderReport {
    /// `(old, new)` file names
    pub renamed: Vec<(String, String)>,
    /// Files left alone because the target already existed
    pub skipped: Vec<String>,
}

impl Engine {
    /// Installed sublet files, in local cache order
    pub async fn reorder_entries(&mut self) -> SurResult<Vec<ReorderEntry>> {
        let dir = self.layout.sublets_dir();
        let mut files = Vec::new();

        if dir.exists() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| SurError::io(format!("reading {}", dir.display()), e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| SurError::io("reading sublet entry", e))?
            {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();

        let mut list = Vec::new();
        for spec in self.cache.local().await? {
            for file in &files {
                let owned = spec
                    .files
                    .iter()
                    .any(|declared| is_installed_copy(file, declared, &spec.name));
                if owned {
                    list.push(ReorderEntry {
                        sublet: spec.name.clone(),
                        version: spec.version.clone(),
                        file: file.clone(),
                    });
                }
            }
        }

        Ok(list)
    }

    /// Rename the chosen entries so they load in the given order
    ///
    /// `order` holds 1-based indices into `entries`; every index is
    /// checked before anything is renamed.
    pub async fn apply_reorder(
        &mut self,
        entries: &[ReorderEntry],
        order: &[usize],
    ) -> SurResult<ReorderReport> {
        if let Some(bad) = order.iter().find(|&&i| i == 0 || i > entries.len()) {
            return Err(SurError::User(format!(
                "No entry {} (choose 1 to {})",
                bad,
                entries.len()
            )));
        }

        let dir = self.layout.sublets_dir();
        let mut report = ReorderReport::default();

        for (position, index) in order.iter().enumerate() {
            let entry = &entries[index - 1];
            let target = entry.target_name(position + 1);
            let target_path = dir.join(&target);

            if target_path.exists() {
                debug!("Not moving {}: {} exists", entry.file, target);
                report.skipped.push(entry.file.clone());
                continue;
            }

            match tokio::fs::rename(dir.join(&entry.file), &target_path).await {
                Ok(()) => {
                    info!("Moved {} to {}", entry.file, target);
                    report.renamed.push((entry.file.clone(), target));
                }
                Err(e) => {
                    warn!("Couldn't move {}: {}", entry.file, e);
                    report.skipped.push(entry.file.clone());
                }
            }
        }

        if !order.is_empty() {
            self.cache.rebuild_local().await?;
        }

        Ok(report)
    }
}

/// Parse a line of blank-separated 1-based indices
pub fn parse_order(line: &str) -> SurResult<Vec<usize>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<usize>()
                .map_err(|_| SurError::User(format!("`{}' is not a number", tok)))
        })
        .collect()
}
