//! Notes command - show the notes of an installed sublet

use crate::cli::args::NotesArgs;
use crate::config::Config;
use crate::error::SurResult;
use crate::ui::{self, UiContext};

/// Execute the notes command
pub async fn execute(args: NotesArgs, config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect();
    let mut engine = super::engine(config, &ctx);

    match engine.notes(&args.name).await? {
        Some(notes) => println!("{}", notes),
        None => ui::step_info(&ctx, &format!("Sublet `{}' has no notes", args.name)),
    }

    Ok(())
}
