//! Update command - rebuild a cache

use crate::cli::args::UpdateArgs;
use crate::config::Config;
use crate::error::{Repository, SurResult};
use crate::ui::{TaskSpinner, UiContext};

/// Execute the update command
pub async fn execute(args: UpdateArgs, config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect();
    let mut engine = super::engine(config, &ctx);
    let repository: Repository = args.repo.into();

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Updating {} cache...", repository));

    match engine.update(repository).await {
        Ok(count) => {
            spinner.stop(&format!(
                "Updated {} cache with {} entries",
                repository, count
            ));
            Ok(())
        }
        Err(e) => {
            spinner.stop_error(&format!("Couldn't update {} cache", repository));
            Err(e)
        }
    }
}
