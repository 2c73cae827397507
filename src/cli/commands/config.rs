//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{SurError, SurResult};
use crate::ui::{self, UiContext};
use toml_edit::{value, Array, DocumentMut, Item};

/// How a config key's value is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bool,
    Integer,
    Text,
    /// Blank-separated words stored as an array
    Words,
}

const KEYS: &[(&str, Kind)] = &[
    ("general.color", Kind::Bool),
    ("general.log_format", Kind::Text),
    ("repository.url", Kind::Text),
    ("repository.timeout_secs", Kind::Integer),
    ("repository.user", Kind::Text),
    ("paths.cache_dir", Kind::Text),
    ("paths.data_dir", Kind::Text),
    ("cache.remote_max_age_hours", Kind::Integer),
    ("host.reload_command", Kind::Words),
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> SurResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> SurResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> SurResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());

    Ok(())
}

/// Set one key in the config file, keeping comments and layout
async fn set_value(manager: &ConfigManager, key: &str, raw: &str) -> SurResult<()> {
    let ctx = UiContext::detect();

    let Some(kind) = KEYS.iter().find(|(k, _)| *k == key).map(|(_, kind)| *kind) else {
        ui::step_error_detail(&ctx, "Unknown config key", key);
        ui::remark(&ctx, "Valid keys:");
        for (key, _) in KEYS {
            eprintln!("  {}", key);
        }
        return Err(SurError::User(format!("Unknown config key: {}", key)));
    };

    let mut doc = manager.load_document().await?;
    apply(&mut doc, key, parse_item(kind, raw)?)?;
    manager.save_document(&doc).await?;

    ui::step_ok(&ctx, &format!("Set {} = {}", key, raw));
    Ok(())
}

/// Write `item` at the dotted `key`, creating the section if needed
fn apply(doc: &mut DocumentMut, key: &str, item: Item) -> SurResult<()> {
    let (section, leaf) = key
        .split_once('.')
        .ok_or_else(|| SurError::User(format!("Invalid config key: {}", key)))?;

    if !doc.contains_key(section) {
        doc.insert(section, toml_edit::table());
    }

    let table = doc[section]
        .as_table_mut()
        .ok_or_else(|| SurError::User(format!("[{}] is not a table", section)))?;
    table.insert(leaf, item);

    Ok(())
}

fn parse_item(kind: Kind, raw: &str) -> SurResult<Item> {
    match kind {
        Kind::Bool => match raw.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(value(true)),
            "false" | "0" | "no" => Ok(value(false)),
            _ => Err(SurError::User(format!(
                "Invalid boolean value: {}. Use true/false",
                raw
            ))),
        },
        Kind::Integer => raw
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .map(value)
            .ok_or_else(|| SurError::User(format!("Invalid number: {}", raw))),
        Kind::Text => Ok(value(raw)),
        Kind::Words => {
            let mut words = Array::new();
            for word in raw.split_whitespace() {
                words.push(word);
            }
            Ok(value(words))
        }
    }
}
