//! Shared CLI helpers: path expansion, banner, starters, and the terminal
//! chat surface.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use colored::Colorize;

use parley_agent::{ChatSurface, STARTERS};

const THINKING: &str = "Thinking...";

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "💬 Parley".cyan().bold(), version.dimmed());
    println!(
        "{}",
        "Type a message, /starters for ideas, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print the numbered starter prompts.
pub fn print_starters() {
    println!("{}", "Starters:".bold());
    for (i, starter) in STARTERS.iter().enumerate() {
        println!(
            "  {} {:<26} {}",
            format!("{}.", i + 1).cyan(),
            starter.label,
            starter.message.dimmed()
        );
    }
    println!("{}", "Send one with /starter <number>.".dimmed());
    println!();
}

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

fn flush_stderr() {
    let _ = std::io::stderr().flush();
}

// ─────────────────────────────────────────────
// TerminalSurface
// ─────────────────────────────────────────────

/// Chat UI on a terminal: placeholder and tool notes on stderr, answers on
/// stdout.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    thinking: bool,
    streamed: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn draw_thinking(&self) {
        eprint!("{}", THINKING.dimmed());
        flush_stderr();
    }

    fn clear_line(&self) {
        eprint!("\r{}\r", " ".repeat(THINKING.len() + 40));
        flush_stderr();
    }
}

#[async_trait]
impl ChatSurface for TerminalSurface {
    async fn show_thinking(&mut self) {
        self.draw_thinking();
        self.thinking = true;
    }

    async fn remove_thinking(&mut self) {
        if self.thinking {
            self.clear_line();
            self.thinking = false;
        }
    }

    async fn begin_response(&mut self) {
        self.streamed = false;
        println!();
        println!("{}", "💬 Parley".cyan().bold());
        flush_stdout();
    }

    async fn stream_token(&mut self, delta: &str) {
        self.streamed = true;
        print!("{delta}");
        flush_stdout();
    }

    async fn finish_response(&mut self, full_text: &str) {
        if self.streamed {
            println!();
        } else if full_text.is_empty() {
            println!("{}", "(no response)".dimmed());
        } else {
            println!("{full_text}");
        }
        println!();
        self.streamed = false;
    }

    async fn show_error(&mut self, text: &str) {
        if self.streamed {
            println!();
            self.streamed = false;
        }
        println!();
        println!("{} {}", "❌".red(), text.red());
        println!();
    }

    async fn tool_activity(&mut self, name: &str) {
        if self.thinking {
            self.clear_line();
        }
        eprintln!("{}", format!("  ↳ using {name}").dimmed());
        if self.thinking {
            self.draw_thinking();
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_home() {
        let result = expand_tilde("~/foo/bar");
        assert!(result.ends_with("foo/bar"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn expand_tilde_no_tilde() {
        let result = expand_tilde("chat_history.json");
        assert_eq!(result, PathBuf::from("chat_history.json"));
    }

    #[test]
    fn expand_tilde_bare() {
        let result = expand_tilde("~");
        assert!(!result.to_string_lossy().contains('~'));
    }

    #[tokio::test]
    async fn surface_tracks_placeholder_and_streaming() {
        let mut surface = TerminalSurface::new();
        surface.show_thinking().await;
        assert!(surface.thinking);

        surface.remove_thinking().await;
        assert!(!surface.thinking);

        surface.begin_response().await;
        surface.stream_token("hi").await;
        assert!(surface.streamed);

        surface.finish_response("hi").await;
        assert!(!surface.streamed);
    }
}
