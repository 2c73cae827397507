//! Terminal output for sur
//!
//! Uses `cliclack` for prompts and spinners and `indicatif` for transfer
//! bars, with plain fallbacks in CI and other non-interactive runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use sur::ui::{self, UiContext, TransferBar};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//! let engine = Engine::from_config(&config).with_progress(Arc::new(TransferBar::new(&ctx)));
//!
//! ui::step_ok(&ctx, "Installed sublet clock (0.3)");
//! let yes = ui::confirm(&ctx, "Upgrade sublets?", false).await?;
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::{set_color, UiContext};
pub use output::{
    note, remark, step_error_detail, step_info, step_ok, step_ok_detail, step_warn,
    step_warn_hint,
};
pub use progress::{TaskSpinner, TransferBar};
pub use prompts::{confirm, input};
pub use theme::{init_theme, SurTheme};
