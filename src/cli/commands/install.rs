//! Install command - install sublets from the repository or package files

use crate::cli::args::InstallArgs;
use crate::config::Config;
use crate::engine::InstallOptions;
use crate::error::SurResult;
use crate::ui::{self, UiContext};

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect();
    let mut engine = super::engine(config, &ctx);
    let last = args.names.len().saturating_sub(1);

    for (i, name) in args.names.iter().enumerate() {
        // Reload once, after the last sublet
        let options = InstallOptions {
            version: args.pin.clone(),
            use_tags: args.tags,
            reload: args.reload && i == last,
        };

        let report = engine.install(name, &options).await?;
        ui::step_ok_detail(
            &ctx,
            &format!("Installed sublet {}", report.spec),
            &format!("{} file(s)", report.files.len()),
        );

        if let Some(notes) = report.spec.notes() {
            ui::note(&ctx, &report.spec.name, notes);
        }

        super::report_reload(&ctx, &report.reload);
    }

    Ok(())
}
