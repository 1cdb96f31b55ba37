//! Session state: conversation history and transcript persistence.
//!
//! A session keeps its history in memory for its whole lifetime and writes
//! it out once, when the session ends.

pub mod history;
pub mod transcript;

pub use history::{ConversationHistory, TranscriptRecord};
pub use transcript::{TranscriptStore, DEFAULT_TRANSCRIPT_FILE};
