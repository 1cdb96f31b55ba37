//! Scripted provider shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use parley_core::types::{LlmResponse, Message, ToolCall, ToolDefinition};
use parley_providers::{ChunkStream, LlmProvider, LlmRequestConfig, ProviderError, StreamChunk};

/// One scripted backend answer.
pub enum Scripted {
    Reply(LlmResponse),
    /// Non-success status before anything is streamed.
    Fail,
    /// Streams `text` as deltas, then breaks off.
    BreakAfter(String),
}

/// A mock LLM provider that returns canned responses in order and records
/// every message list it was sent.
pub struct MockProvider {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockProvider {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self::scripted(responses.into_iter().map(Scripted::Reply).collect())
    }

    pub fn scripted(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn simple(text: &str) -> Self {
        Self::new(vec![LlmResponse::text(text)])
    }

    /// Message lists received so far, one per backend call.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, messages: &[Message]) -> Scripted {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Scripted::Reply(LlmResponse::text("(no more responses)")))
    }
}

pub fn tool_call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall::new(id, name, args.to_string())
}

/// Split text into word-sized deltas, keeping the spaces.
pub fn deltas(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_string).collect()
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn chat(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        match self.next(messages) {
            Scripted::Reply(r) => Ok(r),
            Scripted::Fail | Scripted::BreakAfter(_) => Err(ProviderError::Status {
                status: 500,
                body: "scripted failure".into(),
            }),
        }
    }

    async fn chat_stream(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<ChunkStream, ProviderError> {
        let mut chunks: Vec<Result<StreamChunk, ProviderError>> = Vec::new();
        match self.next(messages) {
            Scripted::Reply(r) => {
                let text = r.content.unwrap_or_default();
                chunks.extend(deltas(&text).into_iter().map(|d| Ok(StreamChunk::TextDelta(d))));
                if !r.tool_calls.is_empty() {
                    chunks.push(Ok(StreamChunk::ToolCalls(r.tool_calls)));
                }
                chunks.push(Ok(StreamChunk::Done {
                    finish_reason: r.finish_reason,
                }));
            }
            Scripted::Fail => {
                return Err(ProviderError::Status {
                    status: 500,
                    body: "scripted failure".into(),
                })
            }
            Scripted::BreakAfter(text) => {
                chunks.extend(deltas(&text).into_iter().map(|d| Ok(StreamChunk::TextDelta(d))));
                chunks.push(Err(ProviderError::Stream("connection reset".into())));
            }
        }
        Ok(futures::stream::iter(chunks).boxed())
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    fn display_name(&self) -> &str {
        "MockProvider"
    }
}
