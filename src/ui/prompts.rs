//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{SurError, SurResult};
use std::io::{self, BufRead, Write};

/// Prompt for confirmation, returns default if non-interactive or auto-yes
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> SurResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| SurError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| SurError::User(format!("Prompt failed: {}", e)))
}

/// Ask for one line of text; an empty answer is allowed
///
/// Without a terminal the line is read from stdin, so answers can be
/// piped in.
pub async fn input(ctx: &UiContext, message: &str) -> SurResult<String> {
    let message = message.to_string();
    let interactive = ctx.is_interactive();

    let result = tokio::task::spawn_blocking(move || {
        if interactive {
            cliclack::input(&message)
                .required(false)
                .default_input("")
                .interact::<String>()
        } else {
            read_line(&message)
        }
    })
    .await
    .map_err(|e| SurError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| SurError::User(format!("Prompt failed: {}", e)))
}

fn read_line(message: &str) -> io::Result<String> {
    print!("{} ", message);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
