//! Build command - package a specification and its files

use crate::cli::args::BuildArgs;
use crate::config::Config;
use crate::error::{SurError, SurResult};
use crate::ui::{self, UiContext};

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect();
    let engine = super::engine(config, &ctx);

    let out_dir = match args.output {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| SurError::io("getting current directory", e))?,
    };

    let package = engine.build(&args.spec, &out_dir).await?;

    ui::step_ok_detail(
        &ctx,
        &format!("Created sublet {}", package.path.display()),
        &format!("sha256 {}", package.sha256),
    );

    Ok(())
}
