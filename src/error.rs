//! Error types for sur
//!
//! All modules use `SurResult<T>` as their return type.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sur operations
pub type SurResult<T> = Result<T, SurError>;

/// Which cache an operation ran against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repository {
    /// Installed sublets
    Local,
    /// Sublets available from the repository server
    Remote,
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Server refusal of a submitted package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// 406: a sublet with this name exists and belongs to someone else
    Duplicate,
    /// 409: this exact version was already submitted
    DuplicateVersion,
    /// 415: the server could not store the upload
    StorageFailure,
    /// Any other status
    Unknown(u16),
}

impl SubmitRejection {
    /// Map a non-success submit status to its rejection kind
    pub fn from_status(status: u16) -> Self {
        match status {
            406 => Self::Duplicate,
            409 => Self::DuplicateVersion,
            415 => Self::StorageFailure,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for SubmitRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate => write!(f, "couldn't overwrite sublet (HTTP 406)"),
            Self::DuplicateVersion => write!(f, "couldn't overwrite sublet version (HTTP 409)"),
            Self::StorageFailure => write!(f, "couldn't store sublet (HTTP 415)"),
            Self::Unknown(status) => write!(f, "couldn't submit sublet (HTTP {})", status),
        }
    }
}

/// Server refusal of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotateRejection {
    /// 404: the digest is unknown to the server
    NotFound,
    /// 415: the server could not store the annotation
    StorageFailure,
    /// Any other status
    Unknown(u16),
}

impl AnnotateRejection {
    /// Map a non-success annotate status to its rejection kind
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            415 => Self::StorageFailure,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for AnnotateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "couldn't find sublet (HTTP 404)"),
            Self::StorageFailure => write!(f, "couldn't store annotation (HTTP 415)"),
            Self::Unknown(status) => write!(f, "couldn't annotate sublet (HTTP {})", status),
        }
    }
}

/// All errors that can occur in sur
#[derive(Error, Debug)]
pub enum SurError {
    // Lifecycle errors
    #[error("Couldn't find sublet `{name}'{} in {repository} repository", version_suffix(.version))]
    NotFound {
        name: String,
        version: Option<String>,
        repository: Repository,
    },

    #[error("Sublet `{0}' is already installed")]
    AlreadyInstalled(String),

    #[error("Sublet `{name}' has unsatisfied dependencies: {}", .missing.join(", "))]
    UnsatisfiedDependency { name: String, missing: Vec<String> },

    #[error("Invalid specification {path}: {} problem(s) found", .diagnostics.len())]
    InvalidSpecification {
        path: PathBuf,
        diagnostics: Vec<String>,
    },

    #[error("Couldn't find file `{}'", .path.display())]
    MissingPackageFile { path: PathBuf },

    #[error("Not a sublet package: {}", .0.display())]
    NotAPackage(PathBuf),

    // Archive and specification parsing
    #[error("Invalid sublet archive {}: {reason}", .path.display())]
    InvalidArchive { path: PathBuf, reason: String },

    #[error("Couldn't parse specification {}: {reason}", .path.display())]
    SpecParse { path: PathBuf, reason: String },

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // Remote repository errors
    #[error("Remote repository unavailable during {operation}{}: {reason}", status_suffix(.status))]
    RemoteUnavailable {
        operation: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Submit rejected: {0}")]
    SubmitRejected(SubmitRejection),

    #[error("Annotate rejected: {0}")]
    AnnotateRejected(AnnotateRejection),

    // Host errors
    #[error("Couldn't reload sublets: {0}")]
    ReloadFailed(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

fn version_suffix(version: &Option<String>) -> String {
    version
        .as_ref()
        .map(|v| format!(" ({})", v))
        .unwrap_or_default()
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" (HTTP {})", s))
        .unwrap_or_default()
}

impl SurError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a remote error from a transport failure
    pub fn remote(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            operation: operation.into(),
            status: None,
            reason: reason.into(),
        }
    }

    /// Create a remote error from an unexpected HTTP status
    pub fn remote_status(operation: impl Into<String>, status: u16) -> Self {
        Self::RemoteUnavailable {
            operation: operation.into(),
            status: Some(status),
            reason: "server returned an error".to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound {
                repository: Repository::Remote,
                ..
            } => Some("Run: sur update remote"),
            Self::NotFound {
                repository: Repository::Local,
                ..
            } => Some("Run: sur list local"),
            Self::AlreadyInstalled(_) => Some("Run: sur uninstall <name> first, or sur upgrade"),
            Self::RemoteUnavailable { .. } => Some("Check repository.url in: sur config show"),
            Self::InvalidSpecification { .. } => Some("Fix the listed problems and build again"),
            Self::SubmitRejected(SubmitRejection::DuplicateVersion) => {
                Some("Bump the version in the specification")
            }
            _ => None,
        }
    }
}
