//! Reorder command - change the load order of installed sublets

use crate::config::Config;
use crate::engine::parse_order;
use crate::error::SurResult;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the reorder command
pub async fn execute(config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect();
    let mut engine = super::engine(config, &ctx);

    let entries = engine.reorder_entries().await?;
    if entries.is_empty() {
        ui::step_info(&ctx, "No sublets installed");
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{} {} ({}) {}",
            style(format!("({})", i + 1)).dim(),
            entry.sublet,
            entry.version,
            style(&entry.file).dim()
        );
    }
    println!();

    let line = ui::input(&ctx, "Enter new numbers separated by blanks:").await?;
    let order = parse_order(&line)?;
    if order.is_empty() {
        ui::remark(&ctx, "Order unchanged");
        return Ok(());
    }

    let report = engine.apply_reorder(&entries, &order).await?;
    for (from, to) in &report.renamed {
        ui::step_ok(&ctx, &format!("Moved {} to {}", from, to));
    }
    for file in &report.skipped {
        ui::step_warn(&ctx, &format!("Left {} in place", file));
    }

    Ok(())
}
