//! Sur - sublet repository client
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use sur::cli::{commands, Cli, Commands};
use sur::config::ConfigManager;
use sur::error::{SurError, SurResult};
use sur::ui;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let SurError::InvalidSpecification { diagnostics, .. } = &e {
                for problem in diagnostics {
                    eprintln!("  - {}", problem);
                }
            }
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> SurResult<()> {
    let cli = Cli::parse();

    // Completions need neither logging nor config
    if let Commands::Completions(args) = cli.command {
        return commands::completions(args);
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config.general.log_format);

    if cli.no_color || !config.general.color {
        ui::set_color(false);
    }
    ui::init_theme();

    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Install(args) => commands::install(args, &config).await,
        Commands::Uninstall(args) => commands::uninstall(args, &config).await,
        Commands::Build(args) => commands::build(args, &config).await,
        Commands::Submit(args) => commands::submit(args, &config).await,
        Commands::Annotate(args) => commands::annotate(args, &config).await,
        Commands::Query(args) => commands::query(args, &config).await,
        Commands::List(args) => commands::list(args, &config).await,
        Commands::Update(args) => commands::update(args, &config).await,
        Commands::Upgrade(args) => commands::upgrade(args, &config).await,
        Commands::Notes(args) => commands::notes(args, &config).await,
        Commands::Reorder => commands::reorder(&config).await,
        Commands::Config(args) => commands::config(args, &config_manager, &config).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("sur=warn"),
        1 => EnvFilter::new("sur=info"),
        _ => EnvFilter::new("sur=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
