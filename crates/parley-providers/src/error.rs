//! Provider errors.

use thiserror::Error;

/// Everything that can go wrong talking to the model backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("request to LLM backend failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("LLM backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a valid chat completion.
    #[error("failed to parse LLM response: {0}")]
    Decode(String),

    /// A successful response carried no choices.
    #[error("LLM response contained no choices")]
    EmptyResponse,

    /// The event stream broke off mid-response.
    #[error("LLM stream interrupted: {0}")]
    Stream(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
