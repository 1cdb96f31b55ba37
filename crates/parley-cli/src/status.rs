//! `parley status`: show environment, tunables and transcript status.

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;

use parley_core::config::secrets::{mask, REQUIRED_VARS};
use parley_core::config::{get_config_path, load_config, save_config, Config};
use parley_core::session::TranscriptStore;

/// Run the status command.
pub fn run(write_default: bool) -> Result<()> {
    let config_path = get_config_path();

    if write_default && !config_path.exists() {
        save_config(&Config::default(), None)?;
        println!("{} wrote {}", "✓".green(), config_path.display());
    }

    let config = load_config(None);

    println!();
    println!("{}", "💬 Parley Status".cyan().bold());
    println!();

    // Environment
    println!("  {}", "Environment:".bold());
    for name in REQUIRED_VARS {
        println!("    {:<20} {}", name, env_status(std::env::var(name).ok()));
    }
    println!();

    // Config
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(defaults)".dimmed().to_string()
        }
    );
    println!(
        "  {:<18} {}",
        "Tool rounds:".bold(),
        config.agent.max_tool_iterations
    );
    println!(
        "  {:<18} {} | max_tokens: {}",
        "Parameters:".bold(),
        format!("temp: {}", config.agent.temperature).dimmed(),
        format!("{}", config.agent.max_tokens).dimmed(),
    );
    println!(
        "  {:<18} {}",
        "Streaming:".bold(),
        if config.agent.stream { "on" } else { "off" }
    );
    println!(
        "  {:<18} backend {}s | weather {}s",
        "Timeouts:".bold(),
        config.http.request_timeout_secs,
        config.http.weather_timeout_secs,
    );

    // Transcript
    let store = TranscriptStore::new(crate::helpers::expand_tilde(&config.transcript.path));
    println!(
        "  {:<18} {} {}",
        "Transcript:".bold(),
        store.path().display(),
        transcript_status(&store)
    );

    println!();

    Ok(())
}

fn env_status(value: Option<String>) -> String {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(v) => format!("{} {}", "✓".green(), mask(&v).dimmed()),
        None => format!("{}", "✗ not set".red()),
    }
}

fn transcript_status(store: &TranscriptStore) -> String {
    if !store.path().exists() {
        return "(none yet)".dimmed().to_string();
    }
    let saved = std::fs::metadata(store.path())
        .and_then(|m| m.modified())
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| "?".into());

    match store.load() {
        Ok(records) => format!(
            "{} {}",
            "✓".green(),
            format!("{} messages, saved {saved}", records.len()).dimmed()
        ),
        Err(e) => format!("{} {}", "✗".red(), format!("unreadable: {e}").dimmed()),
    }
}
