//! Configuration schema for the optional tunables file.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_TRANSCRIPT_FILE;

/// Root configuration: loaded from `~/.parley/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentSettings,
    pub http: HttpSettings,
    pub transcript: TranscriptSettings,
}

/// Run-loop and request settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Maximum model ↔ tool round trips per turn before the turn fails.
    pub max_tool_iterations: u32,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Stream answers token by token instead of waiting for the full text.
    pub stream: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tool_iterations: 10,
            max_tokens: 4096,
            temperature: 0.7,
            stream: true,
        }
    }
}

/// HTTP client timeouts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpSettings {
    /// Timeout for model backend requests, in seconds.
    pub request_timeout_secs: u64,
    /// Timeout for weather API requests, in seconds.
    pub weather_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            weather_timeout_secs: 30,
        }
    }
}

/// Where the session transcript goes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptSettings {
    pub path: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_TRANSCRIPT_FILE.to_string(),
        }
    }
}
