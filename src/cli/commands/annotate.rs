//! Annotate command - flag a repository sublet for review

use crate::cli::args::AnnotateArgs;
use crate::config::Config;
use crate::error::SurResult;
use crate::ui::{self, UiContext};

/// Execute the annotate command
pub async fn execute(args: AnnotateArgs, config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect();
    let mut engine = super::engine(config, &ctx);

    let spec = engine.annotate(&args.name, args.pin).await?;
    ui::step_ok(&ctx, &format!("Annotated sublet {}", spec));

    Ok(())
}
