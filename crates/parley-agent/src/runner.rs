//! Runner: the LLM ↔ tool-calling loop for one turn.
//!
//! Given an agent and the session history, the runner calls the model,
//! executes any requested tools, folds their results back into a private
//! working context and repeats until the model answers in plain text.
//! The session history itself is never touched here.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, info, warn};

use parley_core::types::{Message, ToolCall, ToolDefinition};
use parley_core::utils::truncate_string;
use parley_providers::{LlmProvider, LlmRequestConfig, StreamChunk};

use crate::agent::AgentConfig;
use crate::error::AgentError;

/// Default cap on tool rounds per turn.
pub const DEFAULT_MAX_TOOL_ITERATIONS: u32 = 10;

/// Something that happened during a streamed run.
#[derive(Clone, Debug, PartialEq)]
pub enum RunEvent {
    /// A fragment of assistant text, in backend order.
    TextDelta(String),
    /// The model asked for a tool.
    ToolCallRequested { name: String },
    /// A tool finished; `output` is what the model will read.
    ToolOutput { name: String, output: String },
    /// The run finished; `text` is the final round's full answer.
    Completed { text: String },
}

/// Boxed stream of run events.
pub type RunStream<'a> = BoxStream<'a, Result<RunEvent, AgentError>>;

// ─────────────────────────────────────────────
// Runner
// ─────────────────────────────────────────────

/// Drives agents against one LLM provider.
pub struct Runner {
    provider: Arc<dyn LlmProvider>,
    request_config: LlmRequestConfig,
    max_tool_iterations: u32,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("provider", &self.provider.display_name())
            .field("request_config", &self.request_config)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .finish()
    }
}

impl Runner {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        request_config: LlmRequestConfig,
        max_tool_iterations: u32,
    ) -> Self {
        Self {
            provider,
            request_config,
            max_tool_iterations,
        }
    }

    pub fn max_tool_iterations(&self) -> u32 {
        self.max_tool_iterations
    }

    /// `[system(instructions)] + history`.
    fn working_context(agent: &AgentConfig, history: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(&agent.instructions));
        messages.extend_from_slice(history);
        messages
    }

    /// Run one turn to completion and return the final answer.
    ///
    /// A response with neither text nor tool calls yields an empty string.
    pub async fn run(&self, agent: &AgentConfig, history: &[Message]) -> Result<String, AgentError> {
        let mut messages = Self::working_context(agent, history);
        let tool_defs = agent.tools.definitions();
        let tools = offered(&tool_defs);
        let mut rounds = 0;

        loop {
            debug!(agent = %agent.name, round = rounds, "LLM call");

            let response = self
                .provider
                .chat(&messages, tools, &agent.model, &self.request_config)
                .await?;

            if !response.has_tool_calls() {
                return Ok(response.content.unwrap_or_default());
            }

            self.check_round_limit(agent, rounds)?;
            rounds += 1;

            messages.push(Message::assistant_tool_calls(
                response.content,
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let output = self.invoke(agent, call, rounds).await;
                messages.push(Message::tool_result(&call.id, output));
            }
        }
    }

    /// Run one turn, yielding text deltas as the backend produces them.
    ///
    /// Text from every round is streamed; tool rounds surface as
    /// `ToolCallRequested` / `ToolOutput` pairs between them.
    pub fn run_streamed<'a>(&'a self, agent: &'a AgentConfig, history: &[Message]) -> RunStream<'a> {
        let mut messages = Self::working_context(agent, history);

        let stream = async_stream::try_stream! {
            let tool_defs = agent.tools.definitions();
            let mut rounds = 0;

            loop {
                debug!(agent = %agent.name, round = rounds, "LLM call (streaming)");

                let mut chunks = self
                    .provider
                    .chat_stream(&messages, offered(&tool_defs), &agent.model, &self.request_config)
                    .await?;

                let mut text = String::new();
                let mut calls: Vec<ToolCall> = Vec::new();
                while let Some(chunk) = chunks.next().await {
                    match chunk? {
                        StreamChunk::TextDelta(delta) => {
                            text.push_str(&delta);
                            yield RunEvent::TextDelta(delta);
                        }
                        StreamChunk::ToolCalls(mut batch) => calls.append(&mut batch),
                        StreamChunk::Done { .. } => break,
                    }
                }

                if calls.is_empty() {
                    yield RunEvent::Completed { text };
                    break;
                }

                self.check_round_limit(agent, rounds)?;
                rounds += 1;

                let content = (!text.is_empty()).then_some(text);
                messages.push(Message::assistant_tool_calls(content, calls.clone()));
                for call in &calls {
                    yield RunEvent::ToolCallRequested { name: call.function.name.clone() };
                    let output = self.invoke(agent, call, rounds).await;
                    messages.push(Message::tool_result(&call.id, output.clone()));
                    yield RunEvent::ToolOutput { name: call.function.name.clone(), output };
                }
            }
        };

        stream.boxed()
    }

    fn check_round_limit(&self, agent: &AgentConfig, rounds: u32) -> Result<(), AgentError> {
        if rounds >= self.max_tool_iterations {
            warn!(
                agent = %agent.name,
                limit = self.max_tool_iterations,
                "tool round limit reached"
            );
            return Err(AgentError::ToolIterationLimit {
                agent: agent.name.clone(),
                limit: self.max_tool_iterations,
            });
        }
        Ok(())
    }

    async fn invoke(&self, agent: &AgentConfig, call: &ToolCall, round: u32) -> String {
        info!(
            agent = %agent.name,
            tool = %call.function.name,
            round = round,
            "executing tool call"
        );
        let output = agent
            .tools
            .execute(&call.function.name, &call.function.arguments)
            .await;
        debug!(
            tool = %call.function.name,
            result = %truncate_string(&output, 120),
            "tool result"
        );
        output
    }
}

/// Tool definitions to offer the model; agents without tools send none.
fn offered(defs: &[ToolDefinition]) -> Option<&[ToolDefinition]> {
    (!defs.is_empty()).then_some(defs)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
