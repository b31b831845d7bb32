//! Interactive prompts and console message helpers.

use crate::error::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};

/// Prompt for required text input
pub fn input(message: &str) -> Result<String> {
    let result: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .interact_text()?;
    Ok(result.trim().to_string())
}

/// Block until the operator presses Enter
pub fn pause(message: &str) -> Result<()> {
    let _: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .allow_empty(true)
        .interact_text()?;
    Ok(())
}

/// Display a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Display an info message
pub fn info(message: &str) {
    println!("{} {}", "→".cyan(), message);
}

/// Display a warning message
pub fn warning(message: &str) {
    println!("{} {}", "!".yellow().bold(), message);
}
