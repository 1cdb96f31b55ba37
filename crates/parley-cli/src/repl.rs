//! Interactive REPL: the chat UI loop.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Every way out of the loop ends the session, so the transcript is always
//! written.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use parley_agent::{ChatSession, ChatSurface, STARTERS};

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// What one line of input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Exit,
    ListStarters,
    /// A message to send to the assistant.
    Send(&'a str),
    /// A command the REPL could not make sense of.
    Invalid(String),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    if is_exit_command(trimmed) {
        return Input::Exit;
    }
    if trimmed.eq_ignore_ascii_case("/starters") {
        return Input::ListStarters;
    }
    if let Some(arg) = trimmed.strip_prefix("/starter") {
        let arg = arg.trim();
        return match arg.parse::<usize>() {
            Ok(n) if (1..=STARTERS.len()).contains(&n) => Input::Send(STARTERS[n - 1].message),
            _ => Input::Invalid(format!(
                "Usage: /starter <1-{}> (got \"{arg}\")",
                STARTERS.len()
            )),
        };
    }
    Input::Send(trimmed)
}

/// Run the interactive REPL loop, then end the session.
pub async fn run(mut session: ChatSession, surface: &mut dyn ChatSurface) -> Result<()> {
    helpers::print_banner();
    helpers::print_starters();

    let mut editor = create_editor()?;

    loop {
        // Read input
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ctrl-C: exit cleanly
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                // Ctrl-D: exit cleanly
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let message = match parse_input(&line) {
            Input::Empty => continue,
            Input::Exit => {
                println!("\nGoodbye! 👋");
                break;
            }
            Input::ListStarters => {
                helpers::print_starters();
                continue;
            }
            Input::Invalid(usage) => {
                println!("{}", usage.yellow());
                continue;
            }
            Input::Send(message) => message.to_string(),
        };

        let _ = editor.add_history_entry(line.trim());
        debug!(input_len = message.len(), "processing input");

        // Ctrl-C while a turn is running ends the session too.
        let interrupted = tokio::select! {
            _ = session.handle_message(&message, surface) => false,
            _ = tokio::signal::ctrl_c() => true,
        };
        if interrupted {
            surface.remove_thinking().await;
            println!("\nInterrupted.");
            break;
        }
    }

    save_history(&mut editor);
    session.end().await;

    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    // Load history from ~/.parley/history/cli_history
    let history_path = parley_core::utils::get_history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = parley_core::utils::get_history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("/quit"));
        assert!(is_exit_command(":q"));
        assert!(!is_exit_command("hello"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn parse_plain_and_empty() {
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(parse_input(" quit "), Input::Exit);
        assert_eq!(parse_input("  hello there "), Input::Send("hello there"));
    }

    #[test]
    fn parse_starters() {
        assert_eq!(parse_input("/starters"), Input::ListStarters);
        assert_eq!(
            parse_input("/starter 2"),
            Input::Send("Retrieve information about a student using their ID.")
        );
        assert_eq!(
            parse_input("/starter 4"),
            Input::Send("Generate an 1000 words essay on a given topic.")
        );
        assert!(matches!(parse_input("/starter 0"), Input::Invalid(_)));
        assert!(matches!(parse_input("/starter 5"), Input::Invalid(_)));
        assert!(matches!(parse_input("/starter"), Input::Invalid(_)));
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = parley_core::utils::get_history_path();
        assert!(path.to_string_lossy().contains(".parley"));
        assert!(path.to_string_lossy().contains("cli_history"));
    }
}
