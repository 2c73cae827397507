//! Submit command - upload a package to the repository

use crate::cli::args::SubmitArgs;
use crate::config::Config;
use crate::error::SurResult;
use crate::ui::{self, UiContext};

/// Execute the submit command
pub async fn execute(args: SubmitArgs, config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect();
    let mut engine = super::engine(config, &ctx);

    let spec = engine.submit(&args.package).await?;
    ui::step_ok(&ctx, &format!("Submitted sublet {}", spec));

    Ok(())
}
