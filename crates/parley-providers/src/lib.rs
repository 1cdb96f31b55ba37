//! LLM provider layer for Parley.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`]: trait the run loop talks to (blocking + streaming)
//! - [`http_provider::HttpProvider`]: OpenAI-compatible `/chat/completions` client
//! - [`sse`]: server-sent-event line buffering and tool-call fragment assembly
//! - [`error::ProviderError`]: transport, status, and decode failures

pub mod error;
pub mod http_provider;
pub mod sse;
pub mod traits;

pub use error::ProviderError;
pub use http_provider::HttpProvider;
pub use traits::{ChunkStream, LlmProvider, LlmRequestConfig, StreamChunk};
