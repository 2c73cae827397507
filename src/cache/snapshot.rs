//! YAML snapshots of a cache
//!
//! A snapshot is written to a temporary file beside its target and then
//! renamed over it, so a failed write leaves the previous snapshot intact.

use crate::error::{SurError, SurResult};
use crate::spec::Specification;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Read a snapshot; `None` if the file does not exist
pub fn read(path: &Path) -> SurResult<Option<Vec<Specification>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| SurError::io(format!("reading snapshot {}", path.display()), e))?;

    Ok(Some(serde_yaml::from_str(&content)?))
}

/// Replace the snapshot at `path` with `specs`
pub fn write(path: &Path, specs: &[Specification]) -> SurResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| SurError::Internal(format!("snapshot {} has no parent", path.display())))?;
    std::fs::create_dir_all(dir)
        .map_err(|e| SurError::io(format!("creating directory {}", dir.display()), e))?;

    let content = serde_yaml::to_string(specs)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| SurError::io(format!("creating temp file in {}", dir.display()), e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| SurError::io(format!("writing snapshot {}", path.display()), e))?;
    temp.persist(path)
        .map_err(|e| SurError::io(format!("replacing snapshot {}", path.display()), e.error))?;

    Ok(())
}

/// Time since the snapshot was last written
pub fn age(path: &Path) -> Option<Duration> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    // A timestamp in the future counts as fresh
    Some(
        SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO),
    )
}
