//! Server-sent-event helpers for streamed chat completions.
//!
//! The backend sends `data: {json}` lines separated by blank lines and
//! finishes with `data: [DONE]`. Network chunks split lines arbitrarily, so
//! bytes are buffered until a full line is available.

use parley_core::types::{ChatCompletionChunk, ToolCall, ToolCallChunk};

use crate::error::ProviderError;

/// Sentinel payload that ends an OpenAI-style stream.
pub const DONE_SENTINEL: &str = "[DONE]";

// ─────────────────────────────────────────────
// Line buffering
// ─────────────────────────────────────────────

/// Accumulates raw bytes and yields complete `data:` payloads.
///
/// Bytes are only decoded once a whole line is buffered, so a multi-byte
/// character split across network chunks survives intact.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    /// Feed a network chunk; returns the payloads of every completed line.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>, ProviderError> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = data_payload(decode_line(&line)?) {
                payloads.push(data);
            }
        }
        Ok(payloads)
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Result<Option<String>, ProviderError> {
        let rest = std::mem::take(&mut self.buffer);
        Ok(data_payload(decode_line(&rest)?))
    }
}

fn decode_line(line: &[u8]) -> Result<&str, ProviderError> {
    std::str::from_utf8(line)
        .map_err(|e| ProviderError::Decode(format!("invalid UTF-8 in stream: {e}")))
}

/// Extract the payload of a `data:` line. Comments, blank lines and other
/// SSE fields (`event:`, `id:`) yield `None`.
fn data_payload(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    line.strip_prefix("data:")
        .map(|data| data.trim_start().to_string())
}

// ─────────────────────────────────────────────
// Tool-call assembly
// ─────────────────────────────────────────────

#[derive(Debug, Default)]
struct PartialCall {
    id: String,
    name: String,
    arguments: String,
}

/// Stitches streamed tool-call fragments back into whole [`ToolCall`]s.
///
/// Fragments are keyed by their `index`. Backends that omit the index send
/// each call whole, so those are matched by `id` or appended as new calls.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: Vec<(usize, PartialCall)>,
}

impl ToolCallAccumulator {
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Merge one batch of fragments.
    pub fn push(&mut self, fragments: Vec<ToolCallChunk>) {
        for fragment in fragments {
            let slot = self.slot_for(&fragment);
            let call = &mut self.calls[slot].1;

            if let Some(id) = fragment.id.filter(|id| !id.is_empty()) {
                call.id = id;
            }
            if let Some(function) = fragment.function {
                if let Some(name) = function.name.filter(|n| !n.is_empty()) {
                    call.name = name;
                }
                if let Some(args) = function.arguments {
                    call.arguments.push_str(&args);
                }
            }
        }
    }

    fn slot_for(&mut self, fragment: &ToolCallChunk) -> usize {
        let existing = match (fragment.index, fragment.id.as_deref()) {
            (Some(index), _) => self.calls.iter().position(|(i, _)| *i == index),
            (None, Some(id)) if !id.is_empty() => {
                self.calls.iter().position(|(_, c)| c.id == id)
            }
            (None, _) => self.calls.len().checked_sub(1),
        };

        match existing {
            Some(slot) => slot,
            None => {
                let index = fragment.index.unwrap_or(self.calls.len());
                self.calls.push((index, PartialCall::default()));
                self.calls.len() - 1
            }
        }
    }

    /// Finish assembly, in index order. Calls without an id get a synthetic one.
    pub fn finish(self) -> Vec<ToolCall> {
        let mut calls = self.calls;
        calls.sort_by_key(|(index, _)| *index);
        calls
            .into_iter()
            .enumerate()
            .map(|(n, (_, call))| {
                let id = if call.id.is_empty() {
                    format!("call_{n}")
                } else {
                    call.id
                };
                let arguments = if call.arguments.trim().is_empty() {
                    "{}".to_string()
                } else {
                    call.arguments
                };
                ToolCall::new(id, call.name, arguments)
            })
            .collect()
    }
}

// ─────────────────────────────────────────────
// Payload decoding
// ─────────────────────────────────────────────

/// What one `data:` payload contributed.
#[derive(Debug, Default, PartialEq)]
pub struct PayloadUpdate {
    /// Text fragments, in order.
    pub text: Vec<String>,
    /// Finish reason, if this payload carried one.
    pub finish_reason: Option<String>,
}

/// Decode a single JSON payload, folding tool-call fragments into `calls`.
pub fn apply_payload(
    data: &str,
    calls: &mut ToolCallAccumulator,
) -> Result<PayloadUpdate, ProviderError> {
    let chunk: ChatCompletionChunk = serde_json::from_str(data)
        .map_err(|e| ProviderError::Decode(format!("{e} in stream payload: {data}")))?;

    let mut update = PayloadUpdate::default();
    for choice in chunk.choices {
        if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
            update.text.push(text);
        }
        if let Some(fragments) = choice.delta.tool_calls {
            calls.push(fragments);
        }
        if choice.finish_reason.is_some() {
            update.finish_reason = choice.finish_reason;
        }
    }
    Ok(update)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
