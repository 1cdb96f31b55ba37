//! Transcript persistence: the session-end sink.
//!
//! File format: a single JSON array of `{"role": ..., "content": ...}`
//! objects, pretty-printed with four-space indentation. Each save replaces
//! the whole file through a sibling temp file and a rename, so a crash never
//! leaves a truncated transcript behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use super::history::TranscriptRecord;

/// Default transcript file, relative to the working directory.
pub const DEFAULT_TRANSCRIPT_FILE: &str = "chat_history.json";

/// Reads and writes the transcript file.
#[derive(Clone, Debug)]
pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the transcript with `records`.
    pub fn save(&self, records: &[TranscriptRecord]) -> Result<()> {
        let body = to_pretty_json(records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        let tmp_path = self.temp_path();
        {
            let mut tmp = File::create(&tmp_path)
                .with_context(|| format!("failed to create {}", tmp_path.display()))?;
            tmp.write_all(body.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "failed to move {} into place at {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        debug!(
            path = %self.path.display(),
            records = records.len(),
            "transcript saved"
        );
        Ok(())
    }

    /// Load the transcript. A missing file reads as an empty transcript.
    pub fn load(&self) -> Result<Vec<TranscriptRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid transcript JSON in {}", self.path.display()))
    }

    /// `.<file>.tmp` next to the target, so the rename stays on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_TRANSCRIPT_FILE.to_string());
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSCRIPT_FILE)
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
