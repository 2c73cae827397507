//! List command - show the local or remote cache

use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Repository, SurResult};
use crate::spec::Specification;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

/// A listed sublet with its installed version
#[derive(Serialize)]
struct Listed<'a> {
    #[serde(flatten)]
    spec: &'a Specification,
    installed: Option<String>,
}

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> SurResult<()> {
    let ctx = UiContext::detect();
    let mut engine = super::engine(config, &ctx);
    let repository: Repository = args.repo.into();

    let specs = engine.list(repository).await?;

    if specs.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                ui::step_info(&ctx, &format!("No sublets in {} cache", repository))
            }
        }
        return Ok(());
    }

    print_specs(&mut engine, &specs, args.format).await
}

/// Print specifications with an installed marker, shared with query
pub(super) async fn print_specs(
    engine: &mut Engine,
    specs: &[Specification],
    format: OutputFormat,
) -> SurResult<()> {
    let mut installed = Vec::with_capacity(specs.len());
    for spec in specs {
        installed.push(engine.installed_version(&spec.name).await?);
    }

    match format {
        OutputFormat::Table => {
            for (i, (spec, version)) in specs.iter().zip(&installed).enumerate() {
                for line in entry_lines(i + 1, spec, version.as_deref()) {
                    println!("{}", line);
                }
            }
            println!();
            println!("{} sublet(s)", specs.len());
        }
        OutputFormat::Json => {
            let listed: Vec<Listed> = specs
                .iter()
                .zip(installed)
                .map(|(spec, installed)| Listed { spec, installed })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
        OutputFormat::Plain => {
            for spec in specs {
                println!("{} {}", spec.name.to_lowercase(), spec.version);
            }
        }
    }

    Ok(())
}

/// Lines describing one listed sublet
fn entry_lines(index: usize, spec: &Specification, installed: Option<&str>) -> Vec<String> {
    let mut head = format!(
        "{} {} {}",
        style(format!("({})", index)).dim(),
        style(spec.name.to_lowercase()).bold(),
        style(&spec.version).green()
    );
    if let Some(version) = installed {
        head.push_str(&format!(
            " {}",
            style(format!("[{} installed]", version)).black().on_green()
        ));
    }

    let mut lines = vec![head, format!("   {}", spec.description)];

    if !spec.tags.is_empty() {
        let tags: Vec<String> = spec
            .tags
            .iter()
            .map(|t| style(format!("#{}", t)).magenta().to_string())
            .collect();
        lines.push(format!("   {}", tags.join(" ")));
    }

    lines
}
