//! Query command - search a cache by name, pattern or tag

use crate::cli::args::QueryArgs;
use crate::config::Config;
use crate::error::SurResult;
use crate::matcher::Query;
use crate::ui::UiContext;

/// Execute the query command
pub async fn execute(args: QueryArgs, config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect();
    let mut engine = super::engine(config, &ctx);

    let query = Query::name(args.query)
        .with_version(args.pin)
        .with_regex(args.regex)
        .with_tags(args.tags);

    let found = engine.query(&query, args.repo.into()).await?;
    super::list::print_specs(&mut engine, &found, args.format).await
}
