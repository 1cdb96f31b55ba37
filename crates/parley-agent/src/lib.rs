//! Parley Agent: tools, the run loop, and chat sessions.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, and the weather, student and essay tools
//! - **agent**: Agent configurations and their system prompts
//! - **runner**: The LLM ↔ tool-calling loop (blocking and streaming)
//! - **session**: Session lifecycle glue behind the `ChatSurface` UI seam

pub mod agent;
pub mod error;
pub mod runner;
pub mod session;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use agent::AgentConfig;
pub use error::{AgentError, RegistryError};
pub use runner::{RunEvent, Runner, DEFAULT_MAX_TOOL_ITERATIONS};
pub use session::{ChatSession, ChatSurface, Starter, TurnMode, GENERIC_ERROR_MESSAGE, STARTERS};
pub use tools::{Tool, ToolRegistry};
