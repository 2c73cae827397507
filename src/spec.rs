//! Sublet specification model
//!
//! A specification describes one sublet version: its metadata, the files
//! and icons it ships and the system commands it needs. Specification
//! files are TOML:
//!
//! ```toml
//! name = "Clock"
//! version = "0.3"
//! description = "Show the clock"
//! authors = ["Christoph Kappel"]
//! tags = ["Time"]
//! files = ["clock.rb"]
//! icons = ["icons/clock.xbm"]
//! dependencies = ["date"]
//! ```

use crate::error::{SurError, SurResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Extension of specification files
pub const SPEC_EXTENSION: &str = "spec";

/// Extension of icon files
pub const ICON_EXTENSION: &str = "xbm";

/// Extension of sublet packages
pub const PACKAGE_EXTENSION: &str = "sublet";

/// Versioned package descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Specification {
    /// Display name; matching ignores case
    pub name: String,

    /// Version string
    pub version: String,

    /// One-line summary
    pub description: String,

    /// Authors of the sublet
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    /// Contact address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Release date, free form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Category tags, conventionally capitalized
    pub tags: Vec<String>,

    /// Files relative to the specification file
    pub files: Vec<String>,

    /// Icons relative to the specification file
    pub icons: Vec<String>,

    /// Text shown after installation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// System commands that must be on PATH
    pub dependencies: Vec<String>,

    /// Repository identifier of this version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Location of the installed specification file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Specification {
    /// Parse a specification from TOML text
    pub fn parse(content: &str, origin: &Path) -> SurResult<Self> {
        toml::from_str(content).map_err(|e| SurError::SpecParse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a specification file
    pub async fn from_file(path: &Path) -> SurResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            SurError::io(format!("reading specification {}", path.display()), e)
        })?;
        Self::parse(&content, path)
    }

    /// Check the specification and return every problem found
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.name.is_empty() {
            problems.push("name is missing".to_string());
        } else if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            problems.push(format!(
                "name `{}' may only contain letters, digits, `-' and `_'",
                self.name
            ));
        }

        if self.version.is_empty() {
            problems.push("version is missing".to_string());
        } else if !self.version.starts_with(|c: char| c.is_ascii_digit()) {
            problems.push(format!("version `{}' must start with a digit", self.version));
        } else if !self
            .version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            problems.push(format!(
                "version `{}' may only contain letters, digits, `.', `-' and `_'",
                self.version
            ));
        }

        if self.description.trim().is_empty() {
            problems.push("description is missing".to_string());
        }

        if self.files.is_empty() {
            problems.push("no files declared".to_string());
        }

        for file in self.files.iter().chain(self.icons.iter()) {
            if !is_plain_relative(file) {
                problems.push(format!("path `{}' must be relative and stay inside", file));
            }
        }

        for file in &self.files {
            if has_extension(file, SPEC_EXTENSION) || has_extension(file, ICON_EXTENSION) {
                problems.push(format!(
                    "file `{}' would be installed as a specification or icon",
                    file
                ));
            }
        }

        for icon in &self.icons {
            if !has_extension(icon, ICON_EXTENSION) {
                problems.push(format!("icon `{}' must be an .{} file", icon, ICON_EXTENSION));
            }
        }

        let mut seen = HashSet::new();
        for entry in self.files.iter().chain(self.icons.iter()) {
            let base = basename(entry);
            if !seen.insert(base.to_string()) {
                problems.push(format!("more than one file is named `{}'", base));
            }
        }

        problems
    }

    /// Whether the specification has no validation problems
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Declared commands that cannot be found on PATH
    pub fn missing_dependencies(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .filter(|cmd| which::which(cmd.as_str()).is_err())
            .cloned()
            .collect()
    }

    /// Whether the sublet can be installed on this system
    pub fn is_satisfied(&self) -> bool {
        self.missing_dependencies().is_empty()
    }

    /// Numeric reading of the version, used only for upgrade decisions
    ///
    /// Parses the leading decimal number and ignores the rest, so
    /// `"0.15"` is 0.15, `"1.2.3"` is 1.2 and `"beta"` is 0.0.
    pub fn numeric_version(&self) -> f64 {
        leading_float(&self.version)
    }

    /// `<name>-<version>`, the installed specification's file stem
    pub fn ident(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// File name of the installed specification
    pub fn spec_file_name(&self) -> String {
        format!("{}.{}", self.ident(), SPEC_EXTENSION)
    }

    /// File name of the package built from this specification
    pub fn archive_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.name.to_lowercase(),
            self.version,
            PACKAGE_EXTENSION
        )
    }

    /// Non-empty notes, if any
    pub fn notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
    }

    /// Case-insensitive name comparison
    pub fn same_name(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

/// Sort specifications by `(name, version)` as plain strings
pub fn sort_specs(specs: &mut [Specification]) {
    specs.sort_by(|a, b| (&a.name, &a.version).cmp(&(&b.name, &b.version)));
}

/// Last path component of a declared file
pub fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

fn has_extension(path: &str, ext: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn is_plain_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_end = end;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if frac > end + 1 {
            end = frac;
        }
    }

    if end == int_end && int_end == int_start {
        return 0.0;
    }

    s[..end].parse().unwrap_or(0.0)
}
