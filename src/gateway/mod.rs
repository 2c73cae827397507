//! Remote repository gateway
//!
//! The engine talks to the repository through the [`Gateway`] trait so
//! that the transport can be swapped out. [`HttpGateway`] is the shipped
//! implementation.

mod http;

pub use http::HttpGateway;

use crate::error::SurResult;
use crate::spec::Specification;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Observer for a single blocking transfer
///
/// Called synchronously from inside the transfer loop.
pub trait TransferProgress: Send + Sync {
    /// A transfer labelled `label` begins
    fn start(&self, label: &str, total: Option<u64>);

    /// `done` bytes of `total` have moved
    fn advance(&self, done: u64, total: Option<u64>);

    /// The transfer ended, successfully or not
    fn finish(&self);
}

/// Progress observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl TransferProgress for NoProgress {
    fn start(&self, _label: &str, _total: Option<u64>) {}
    fn advance(&self, _done: u64, _total: Option<u64>) {}
    fn finish(&self) {}
}

/// Operations offered by the repository server
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch every specification the repository offers
    async fn list(&self) -> SurResult<Vec<Specification>>;

    /// Stream the package with `digest` into `dest`, returning its size
    async fn fetch(
        &self,
        digest: &str,
        dest: &Path,
        progress: Arc<dyn TransferProgress>,
    ) -> SurResult<u64>;

    /// Upload a package, returning the server's HTTP status
    async fn submit(
        &self,
        package: &Path,
        user: &str,
        progress: Arc<dyn TransferProgress>,
    ) -> SurResult<u16>;

    /// Mark a package for review, returning the server's HTTP status
    async fn annotate(&self, digest: &str, user: &str) -> SurResult<u16>;
}

/// Decode the body of the list endpoint
///
/// The repository historically wraps the YAML sequence in a YAML
/// string; both forms are accepted.
pub fn decode_list(body: &str) -> SurResult<Vec<Specification>> {
    match serde_yaml::from_str::<Vec<Specification>>(body) {
        Ok(specs) => Ok(specs),
        Err(direct) => match serde_yaml::from_str::<String>(body) {
            Ok(inner) => Ok(serde_yaml::from_str(&inner)?),
            Err(_) => Err(direct.into()),
        },
    }
}
