//! Uninstall command - remove installed sublets

use crate::cli::args::InstallArgs;
use crate::config::Config;
use crate::engine::UninstallOptions;
use crate::error::SurResult;
use crate::ui::{self, UiContext};

/// Execute the uninstall command
pub async fn execute(args: InstallArgs, config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect();
    let mut engine = super::engine(config, &ctx);
    let last = args.names.len().saturating_sub(1);

    for (i, name) in args.names.iter().enumerate() {
        let options = UninstallOptions {
            version: args.pin.clone(),
            use_tags: args.tags,
            reload: args.reload && i == last,
        };

        let report = engine.uninstall(name, &options).await?;

        for (path, reason) in &report.failures {
            ui::step_error_detail(
                &ctx,
                &format!("Couldn't remove {}", path.display()),
                reason,
            );
        }

        if report.is_clean() {
            ui::step_ok(&ctx, &format!("Uninstalled sublet {}", report.spec));
        } else {
            ui::step_warn(
                &ctx,
                &format!(
                    "Uninstalled sublet {} with {} leftover file(s)",
                    report.spec,
                    report.failures.len()
                ),
            );
        }

        super::report_reload(&ctx, &report.reload);
    }

    Ok(())
}
