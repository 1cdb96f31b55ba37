//! Conversation history: the ordered, append-only message log of one chat.
//!
//! History holds only what the user saw: user messages and final assistant
//! answers. Tool round-trips live in the run loop's working context and are
//! never written here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Message;

/// One `{role, content}` entry of a persisted transcript.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptRecord {
    pub role: String,
    pub content: String,
}

impl TranscriptRecord {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

impl From<&Message> for TranscriptRecord {
    fn from(msg: &Message) -> Self {
        TranscriptRecord::new(msg.role().as_str(), msg.text())
    }
}

/// Ordered message history scoped to a single session.
#[derive(Clone, Debug)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    started_at: DateTime<Utc>,
}

impl ConversationHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append a final assistant answer.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// All messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// When this history was created (session start).
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Flatten into transcript records for persistence.
    pub fn records(&self) -> Vec<TranscriptRecord> {
        self.messages.iter().map(TranscriptRecord::from).collect()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}
