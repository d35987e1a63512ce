//! CLI command implementations

pub mod deck;
pub mod generate;
pub mod health;
pub mod research;
pub mod templates;

use anyhow::Result;

/// Reject output formats a command does not support
pub(crate) fn check_format(format: &str) -> Result<()> {
    match format {
        "text" | "json" => Ok(()),
        other => anyhow::bail!("Unknown format '{}'. Use: text, json", other),
    }
}

/// Shorten text to `max` characters for one-line listings
pub(crate) fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
