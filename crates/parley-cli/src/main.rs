//! Parley CLI: entry point.
//!
//! # Commands
//!
//! - `parley chat [-m MESSAGE] [--no-stream] [--logs]`: chat (single-shot or REPL)
//! - `parley status [--write-default]`: show environment, tunables and transcript

mod helpers;
mod repl;
mod status;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use parley_agent::tools::WeatherTool;
use parley_agent::{AgentConfig, ChatSession, Runner, TurnMode};
use parley_core::config::{load_config, Config, Secrets};
use parley_core::session::TranscriptStore;
use parley_providers::{HttpProvider, LlmRequestConfig};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Parley: a tool-augmented chat assistant for your terminal
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Wait for whole answers instead of streaming tokens
        #[arg(long, default_value_t = false)]
        no_stream: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show environment, tunables and transcript status
    Status {
        /// Write a config file with default tunables if none exists
        #[arg(long, default_value_t = false)]
        write_default: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            no_stream,
            logs,
        } => {
            let secrets = require_secrets();
            init_logging(logs);
            run_chat(secrets, message, !no_stream).await
        }
        Commands::Status { write_default } => status::run(write_default),
    }
}

/// Read the required environment, or print the missing variable and exit 1.
fn require_secrets() -> Secrets {
    match Secrets::from_env() {
        Ok(secrets) => secrets,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            std::process::exit(1);
        }
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(secrets: Secrets, message: Option<String>, stream: bool) -> Result<()> {
    let config = load_config(None);
    let mut session = build_session(&secrets, &config, stream)?;
    let mut surface = helpers::TerminalSurface::new();

    match message {
        Some(msg) => {
            info!("processing single message");
            session.handle_message(&msg, &mut surface).await;
            session.end().await;
        }
        None => repl::run(session, &mut surface).await?,
    }

    Ok(())
}

/// Build the provider, runner, agents and session from config + secrets.
fn build_session(secrets: &Secrets, config: &Config, stream: bool) -> Result<ChatSession> {
    let provider = HttpProvider::new(
        &secrets.api_url,
        &secrets.api_key,
        &secrets.model,
        Duration::from_secs(config.http.request_timeout_secs),
    )
    .context("failed to create LLM provider")?;

    let request_config = LlmRequestConfig {
        max_tokens: config.agent.max_tokens,
        temperature: config.agent.temperature,
    };
    let runner = Arc::new(Runner::new(
        Arc::new(provider),
        request_config,
        config.agent.max_tool_iterations,
    ));

    let weather = WeatherTool::new(
        &secrets.weather_api_url,
        &secrets.weather_api_key,
        Duration::from_secs(config.http.weather_timeout_secs),
    )?;
    let agent = AgentConfig::chatbot(runner.clone(), &secrets.model, weather)
        .context("failed to configure agent")?;

    let transcript = TranscriptStore::new(helpers::expand_tilde(&config.transcript.path));
    let mode = TurnMode::from_stream_flag(stream && config.agent.stream);

    Ok(ChatSession::start(runner, Arc::new(agent), transcript, mode))
}

/// Initialize tracing/logging. Logs go to stderr; `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("parley=debug,info"),
        Err(_) => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
