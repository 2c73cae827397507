//! Sublet package codec
//!
//! A package is a plain tar archive named `<name>-<version>.sublet`. It
//! holds the specification file and every declared file and icon, all
//! stored flat under their basenames.

use crate::error::{SurError, SurResult};
use crate::layout::Layout;
use crate::spec::{basename, Specification, ICON_EXTENSION, SPEC_EXTENSION};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Mode stamped on every archive entry and installed file
const ENTRY_MODE: u32 = 0o644;

/// Where an archive entry is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// The specification directory
    Specification,
    /// The icon directory
    Icon,
    /// The sublet directory
    Sublet,
}

/// Extension routing; anything not listed goes to [`Destination::Sublet`]
const ROUTES: &[(&str, Destination)] = &[
    (SPEC_EXTENSION, Destination::Specification),
    (ICON_EXTENSION, Destination::Icon),
];

impl Destination {
    /// Route an entry by its file extension
    pub fn for_entry(name: &str) -> Self {
        let ext = Path::new(name).extension().and_then(|e| e.to_str());

        ext.and_then(|ext| {
            ROUTES
                .iter()
                .find(|(route, _)| route.eq_ignore_ascii_case(ext))
                .map(|(_, dest)| *dest)
        })
        .unwrap_or(Self::Sublet)
    }

    /// Directory this destination maps to
    pub fn dir(&self, layout: &Layout) -> PathBuf {
        match self {
            Self::Specification => layout.specs_dir(),
            Self::Icon => layout.icons_dir(),
            Self::Sublet => layout.sublets_dir(),
        }
    }
}

/// A freshly built package
#[derive(Debug, Clone)]
pub struct BuiltPackage {
    /// Location of the archive
    pub path: PathBuf,
    /// Hex SHA-256 of the archive
    pub sha256: String,
}

/// One payload file inside a package
#[derive(Debug, Clone)]
pub struct Entry {
    /// Basename of the file
    pub name: String,
    /// File contents
    pub data: Vec<u8>,
}

impl Entry {
    pub fn destination(&self) -> Destination {
        Destination::for_entry(&self.name)
    }
}

/// A decoded package; nothing has been written yet
#[derive(Debug, Clone)]
pub struct Package {
    /// The embedded specification
    pub spec: Specification,
    /// Every entry, including the specification file
    pub entries: Vec<Entry>,
}

/// Result of extracting a package
#[derive(Debug, Clone)]
pub enum Extraction {
    /// All entries were written
    Installed {
        spec: Specification,
        files: Vec<PathBuf>,
    },
    /// Dependencies are missing; nothing was written
    Unsatisfied {
        spec: Specification,
        missing: Vec<String>,
    },
}

/// Build a package from `spec`, declared in `spec_file`, into `out_dir`
///
/// Every declared file and icon must exist relative to the directory of
/// `spec_file`; otherwise nothing is written.
pub fn build(spec: &Specification, spec_file: &Path, out_dir: &Path) -> SurResult<BuiltPackage> {
    let base = spec_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let declared: Vec<&String> = spec.files.iter().chain(spec.icons.iter()).collect();
    for file in &declared {
        if !base.join(file).is_file() {
            return Err(SurError::MissingPackageFile {
                path: PathBuf::from(file.as_str()),
            });
        }
    }

    let spec_name = spec_file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SurError::User(format!("Invalid file name: {}", spec_file.display())))?;

    let mut sources = vec![(spec_entry_name(spec_name), spec_file.to_path_buf())];
    for file in declared {
        sources.push((basename(file).to_string(), base.join(file)));
    }

    let target = out_dir.join(spec.archive_name());
    let temp = tempfile::NamedTempFile::new_in(out_dir)
        .map_err(|e| SurError::io(format!("creating temp file in {}", out_dir.display()), e))?;

    let mtime = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut builder = tar::Builder::new(temp);
    for (name, source) in &sources {
        let data = std::fs::read(source)
            .map_err(|e| SurError::io(format!("reading {}", source.display()), e))?;

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(ENTRY_MODE);
        header.set_mtime(mtime);

        builder
            .append_data(&mut header, name, data.as_slice())
            .map_err(|e| SurError::io(format!("adding {} to package", name), e))?;
        debug!("Added {} to {}", name, target.display());
    }

    let temp = builder
        .into_inner()
        .map_err(|e| SurError::io("finishing package", e))?;
    temp.persist(&target)
        .map_err(|e| SurError::io(format!("writing {}", target.display()), e.error))?;

    let sha256 = sha256_file(&target)?;
    info!("Created sublet {}", target.display());

    Ok(BuiltPackage {
        path: target,
        sha256,
    })
}

/// Decode a package without writing anything
pub fn read(path: &Path) -> SurResult<Package> {
    let invalid = |reason: String| SurError::InvalidArchive {
        path: path.to_path_buf(),
        reason,
    };

    let file =
        File::open(path).map_err(|e| SurError::io(format!("opening {}", path.display()), e))?;
    let mut archive = tar::Archive::new(file);

    let mut entries = Vec::new();
    for entry in archive.entries().map_err(|e| invalid(e.to_string()))? {
        let mut entry = entry.map_err(|e| invalid(e.to_string()))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let entry_path = entry.path().map_err(|e| invalid(e.to_string()))?;
        let name = entry_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| invalid(format!("bad entry name {}", entry_path.display())))?;

        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| invalid(e.to_string()))?;
        entries.push(Entry { name, data });
    }

    let mut specs = entries
        .iter()
        .filter(|e| e.destination() == Destination::Specification);
    let spec_entry = match (specs.next(), specs.next()) {
        (Some(entry), None) => entry,
        (None, _) => return Err(invalid("no specification inside".to_string())),
        (Some(_), Some(_)) => return Err(invalid("more than one specification".to_string())),
    };

    let text = String::from_utf8(spec_entry.data.clone())
        .map_err(|_| invalid("specification is not UTF-8".to_string()))?;
    let spec = Specification::parse(&text, path)?;

    Ok(Package { spec, entries })
}

/// Install a package into `layout`
///
/// Nothing is written unless the specification's dependencies are
/// satisfied. Payload files and icons are written before the
/// specification so an installed specification never lists files that
/// are not there yet.
pub fn extract(path: &Path, layout: &Layout) -> SurResult<Extraction> {
    let Package { spec, entries } = read(path)?;

    // Installed names derive from the embedded spec
    let diagnostics = spec.validate();
    if !diagnostics.is_empty() {
        return Err(SurError::InvalidSpecification {
            path: path.to_path_buf(),
            diagnostics,
        });
    }

    let missing = spec.missing_dependencies();
    if !missing.is_empty() {
        debug!("Not extracting {}: missing {}", spec, missing.join(", "));
        return Ok(Extraction::Unsatisfied { spec, missing });
    }

    let (spec_entries, payload): (Vec<Entry>, Vec<Entry>) = entries
        .into_iter()
        .partition(|e| e.destination() == Destination::Specification);

    let mut files = Vec::new();
    for entry in &payload {
        let dest = entry.destination();
        info!("Installing {:?} `{}'", dest, entry.name);
        files.push(write_atomic(&dest.dir(layout), &entry.name, &entry.data)?);
    }

    let mut installed = spec;
    for entry in &spec_entries {
        let name = installed.spec_file_name();
        info!("Installing specification `{}'", name);
        let written = write_atomic(&layout.specs_dir(), &name, &entry.data)?;
        installed.path = Some(written.clone());
        files.push(written);
    }

    Ok(Extraction::Installed {
        spec: installed,
        files,
    })
}

/// Archive name of the specification source, always with a `.spec` extension
fn spec_entry_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let is_spec = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SPEC_EXTENSION));
    if is_spec {
        return file_name.to_string();
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    format!("{}.{}", stem, SPEC_EXTENSION)
}

/// Write `data` to `dir/name` through a temp file and rename
fn write_atomic(dir: &Path, name: &str, data: &[u8]) -> SurResult<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| SurError::io(format!("creating directory {}", dir.display()), e))?;

    let target = dir.join(name);
    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| SurError::io(format!("creating temp file in {}", dir.display()), e))?;
    temp.write_all(data)
        .map_err(|e| SurError::io(format!("writing {}", target.display()), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(ENTRY_MODE);
        temp.as_file()
            .set_permissions(perms)
            .map_err(|e| SurError::io(format!("setting permissions on {}", target.display()), e))?;
    }

    temp.persist(&target)
        .map_err(|e| SurError::io(format!("installing {}", target.display()), e.error))?;

    Ok(target)
}

/// Hex SHA-256 of a file's contents
fn sha256_file(path: &Path) -> SurResult<String> {
    let contents =
        std::fs::read(path).map_err(|e| SurError::io(format!("reading {}", path.display()), e))?;

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok(hex::encode(hasher.finalize()))
}
