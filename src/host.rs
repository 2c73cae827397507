//! Reload notification for the host window manager
//!
//! After sublets change on disk the host has to re-read them. The
//! notifier is a trait so the engine can run without a live host.

use crate::error::{SurError, SurResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Something that can ask the host to reload its sublets
#[async_trait]
pub trait HostNotifier: Send + Sync {
    /// Ask the host to reload every installed sublet
    async fn reload_packages(&self) -> SurResult<()>;
}

/// Notifier that runs a configured command, `subtler -r` by default
pub struct CommandNotifier {
    command: Vec<String>,
}

impl CommandNotifier {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl HostNotifier for CommandNotifier {
    async fn reload_packages(&self) -> SurResult<()> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| SurError::ReloadFailed("no reload command configured".to_string()))?;

        debug!("Executing: {} {:?}", program, args);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SurError::ReloadFailed(format!("couldn't run {}: {}", program, e)))?;

        if output.status.success() {
            info!("Reloaded sublets");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("{} exited with {}", program, output.status),
                detail => format!("{} exited with {}: {}", program, output.status, detail),
            };
            Err(SurError::ReloadFailed(reason))
        }
    }
}
