//! CLI command implementations

pub mod annotate;
pub mod build;
pub mod completions;
pub mod config;
pub mod install;
pub mod list;
pub mod notes;
pub mod query;
pub mod reorder;
pub mod submit;
pub mod uninstall;
pub mod update;
pub mod upgrade;

pub use annotate::execute as annotate;
pub use build::execute as build;
pub use completions::execute as completions;
pub use config::execute as config;
pub use install::execute as install;
pub use list::execute as list;
pub use notes::execute as notes;
pub use query::execute as query;
pub use reorder::execute as reorder;
pub use submit::execute as submit;
pub use uninstall::execute as uninstall;
pub use update::execute as update;
pub use upgrade::execute as upgrade;

use crate::config::Config;
use crate::engine::{Engine, ReloadStatus};
use crate::ui::{self, TransferBar, UiContext};
use std::sync::Arc;

/// Engine for the configured repository, reporting transfers to the terminal
fn engine(config: &Config, ctx: &UiContext) -> Engine {
    Engine::from_config(config).with_progress(Arc::new(TransferBar::new(ctx)))
}

/// Tell the user how the host reload went
fn report_reload(ctx: &UiContext, status: &ReloadStatus) {
    match status {
        ReloadStatus::Skipped => {}
        ReloadStatus::Done => ui::step_ok(ctx, "Reloaded sublets"),
        ReloadStatus::Failed(reason) => ui::step_warn_hint(ctx, reason, "Run: subtler -r"),
    }
}
