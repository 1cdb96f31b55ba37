//! Chat session: start, message and end handling for one conversation.
//!
//! A [`ChatSession`] owns the conversation history and the configured agent.
//! The UI is reached only through the [`ChatSurface`] trait, so the same
//! session logic drives the terminal REPL and the tests.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, error, info};

use parley_core::session::{ConversationHistory, TranscriptStore};

use crate::agent::AgentConfig;
use crate::error::AgentError;
use crate::runner::{RunEvent, Runner};

/// The only text a user sees when a turn fails.
pub const GENERIC_ERROR_MESSAGE: &str =
    "An error occurred while processing your request. Please try again.";

// ─────────────────────────────────────────────
// Starters
// ─────────────────────────────────────────────

/// A suggested opening prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Starter {
    pub label: &'static str,
    pub message: &'static str,
    pub icon: &'static str,
}

pub const STARTERS: [Starter; 4] = [
    Starter {
        label: "Get Current Weather",
        message: "Fetch the current weather for a specified location.",
        icon: "/public/weather.svg",
    },
    Starter {
        label: "Get Student Info",
        message: "Retrieve information about a student using their ID.",
        icon: "/public/student.svg",
    },
    Starter {
        label: "Explore General Questions",
        message: "Find answers to the given questions.",
        icon: "/public/question.svg",
    },
    Starter {
        label: "Write an Essay",
        message: "Generate an 1000 words essay on a given topic.",
        icon: "/public/article.svg",
    },
];

// ─────────────────────────────────────────────
// ChatSurface
// ─────────────────────────────────────────────

/// What the session needs from a chat UI.
#[async_trait]
pub trait ChatSurface: Send {
    /// Show the "Thinking..." placeholder.
    async fn show_thinking(&mut self);
    /// Take the placeholder down again.
    async fn remove_thinking(&mut self);
    /// Open a new, empty assistant message.
    async fn begin_response(&mut self);
    /// Append a streamed fragment to the open message.
    async fn stream_token(&mut self, delta: &str);
    /// Close the open message. Blocking turns deliver the whole answer here.
    async fn finish_response(&mut self, full_text: &str);
    /// Show an error in place of an answer.
    async fn show_error(&mut self, text: &str);
    /// Note that a tool is running.
    async fn tool_activity(&mut self, name: &str);
}

/// Whether answers are streamed token by token or delivered whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnMode {
    Streaming,
    Blocking,
}

impl TurnMode {
    pub fn from_stream_flag(stream: bool) -> Self {
        if stream {
            TurnMode::Streaming
        } else {
            TurnMode::Blocking
        }
    }
}

// ─────────────────────────────────────────────
// ChatSession
// ─────────────────────────────────────────────

/// One conversation: history, agent, and where the transcript goes.
///
/// `handle_message` takes `&mut self`, so turns within a session never
/// overlap.
pub struct ChatSession {
    runner: Arc<Runner>,
    agent: Arc<AgentConfig>,
    transcript: TranscriptStore,
    mode: TurnMode,
    history: ConversationHistory,
}

/// Tracks the placeholder so it is taken down exactly once per turn.
struct Placeholder {
    shown: bool,
}

impl Placeholder {
    async fn show(surface: &mut dyn ChatSurface) -> Self {
        surface.show_thinking().await;
        Self { shown: true }
    }

    async fn remove(&mut self, surface: &mut dyn ChatSurface) {
        if self.shown {
            surface.remove_thinking().await;
            self.shown = false;
        }
    }
}

impl ChatSession {
    /// Start a session with an empty history.
    pub fn start(
        runner: Arc<Runner>,
        agent: Arc<AgentConfig>,
        transcript: TranscriptStore,
        mode: TurnMode,
    ) -> Self {
        info!(
            agent = %agent.name,
            model = %agent.model,
            mode = ?mode,
            transcript = %transcript.path().display(),
            "chat session started"
        );
        Self {
            runner,
            agent,
            transcript,
            mode,
            history: ConversationHistory::new(),
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn mode(&self) -> TurnMode {
        self.mode
    }

    /// Handle one user message.
    ///
    /// On success the history gains the user message and the assistant's
    /// answer. On failure the surface shows [`GENERIC_ERROR_MESSAGE`] and
    /// only the user message is kept.
    pub async fn handle_message(&mut self, text: &str, surface: &mut dyn ChatSurface) {
        let mut placeholder = Placeholder::show(surface).await;
        self.history.push_user(text);

        let result = match self.mode {
            TurnMode::Streaming => self.streaming_turn(surface, &mut placeholder).await,
            TurnMode::Blocking => self.blocking_turn(surface, &mut placeholder).await,
        };

        placeholder.remove(surface).await;

        match result {
            Ok(answer) => {
                debug!(chars = answer.len(), "turn completed");
                self.history.push_assistant(answer);
            }
            Err(e) => {
                error!(error = %e, agent = %self.agent.name, "turn failed");
                surface.show_error(GENERIC_ERROR_MESSAGE).await;
            }
        }
    }

    async fn blocking_turn(
        &self,
        surface: &mut dyn ChatSurface,
        placeholder: &mut Placeholder,
    ) -> Result<String, AgentError> {
        let answer = self.runner.run(&self.agent, self.history.messages()).await?;
        placeholder.remove(surface).await;
        surface.begin_response().await;
        surface.finish_response(&answer).await;
        Ok(answer)
    }

    /// The transcript keeps every streamed delta, across all rounds, in order.
    async fn streaming_turn(
        &self,
        surface: &mut dyn ChatSurface,
        placeholder: &mut Placeholder,
    ) -> Result<String, AgentError> {
        let mut events = self.runner.run_streamed(&self.agent, self.history.messages());
        let mut answer = String::new();
        let mut opened = false;

        while let Some(event) = events.next().await {
            match event? {
                RunEvent::TextDelta(delta) => {
                    if !opened {
                        placeholder.remove(surface).await;
                        surface.begin_response().await;
                        opened = true;
                    }
                    surface.stream_token(&delta).await;
                    answer.push_str(&delta);
                }
                RunEvent::ToolCallRequested { name } => surface.tool_activity(&name).await,
                RunEvent::ToolOutput { name, output } => {
                    debug!(tool = %name, result_len = output.len(), "tool output");
                }
                RunEvent::Completed { .. } => break,
            }
        }

        if !opened {
            placeholder.remove(surface).await;
            surface.begin_response().await;
        }
        surface.finish_response(&answer).await;
        Ok(answer)
    }

    /// End the session and write the transcript. Failures are logged only.
    pub async fn end(self) {
        let records = self.history.records();
        let started_at = self.history.started_at();
        let store = self.transcript;
        let count = records.len();

        let outcome = tokio::task::spawn_blocking(move || {
            store.save(&records).map(|_| store)
        })
        .await;

        match outcome {
            Ok(Ok(store)) => info!(
                messages = count,
                started_at = %started_at.to_rfc3339(),
                path = %store.path().display(),
                "transcript saved"
            ),
            Ok(Err(e)) => error!(error = %e, "failed to save transcript"),
            Err(e) => error!(error = %e, "transcript task failed"),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
