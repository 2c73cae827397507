//! Upgrade command - replace installed sublets with newer versions

use crate::cli::args::UpgradeArgs;
use crate::config::Config;
use crate::engine::UpgradeCandidate;
use crate::error::SurResult;
use crate::ui::{self, TaskSpinner, UiContext};
use console::style;

/// Execute the upgrade command
pub async fn execute(args: UpgradeArgs, config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let mut engine = super::engine(config, &ctx);

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Checking for upgrades...");
    let plan = match engine.plan_upgrade().await {
        Ok(plan) => {
            spinner.clear();
            plan
        }
        Err(e) => {
            spinner.stop_error("Couldn't check for upgrades");
            return Err(e);
        }
    };

    if plan.is_empty() {
        ui::step_ok(&ctx, "All sublets are up to date");
        return Ok(());
    }

    for candidate in &plan {
        println!("{}", plan_line(candidate));
    }

    if !ui::confirm(&ctx, "Upgrade sublets?", false).await? {
        ui::remark(&ctx, "Nothing upgraded; pass --yes to skip this question");
        return Ok(());
    }

    let report = engine.apply_upgrade(&plan, args.reload).await?;
    for spec in &report.upgraded {
        ui::step_ok(&ctx, &format!("Upgraded sublet {}", spec));
    }
    super::report_reload(&ctx, &report.reload);

    Ok(())
}

/// `name: old -> new`
fn plan_line(candidate: &UpgradeCandidate) -> String {
    format!(
        "{}: {} -> {}",
        candidate.installed.name,
        style(&candidate.installed.version).magenta(),
        style(&candidate.available.version).green()
    )
}
