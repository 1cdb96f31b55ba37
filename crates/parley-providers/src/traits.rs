//! LLM Provider trait: the seam between the run loop and the backend.
//!
//! `HttpProvider` covers any OpenAI-compatible API; tests swap in scripted
//! fakes.

use async_trait::async_trait;
use futures::stream::BoxStream;
use parley_core::types::{LlmResponse, Message, ToolCall, ToolDefinition};

use crate::error::ProviderError;

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// One event of a streamed completion.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamChunk {
    /// A fragment of assistant text, in generation order.
    TextDelta(String),
    /// Every tool call of this completion, fully assembled.
    ToolCalls(Vec<ToolCall>),
    /// End of the completion.
    Done { finish_reason: Option<String> },
}

/// Boxed stream of completion events.
pub type ChunkStream = BoxStream<'static, Result<StreamChunk, ProviderError>>;

/// Trait that all LLM providers implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and wait for the full answer.
    ///
    /// # Arguments
    /// * `messages`: Working context in OpenAI format.
    /// * `tools`   : Tool definitions the model may call (`None` for no tools).
    /// * `model`   : Model identifier.
    /// * `config`  : Temperature, max_tokens.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// Send a chat completion request and receive the answer incrementally.
    ///
    /// Text arrives as [`StreamChunk::TextDelta`]s in order; tool calls are
    /// delivered once, complete, before the final [`StreamChunk::Done`].
    async fn chat_stream(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<ChunkStream, ProviderError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
