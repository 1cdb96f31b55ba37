//! Agent errors.

use parley_providers::ProviderError;
use thiserror::Error;

/// Failures that end a turn. The session layer turns every one of these into
/// the generic user-facing apology.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model backend failed (transport, status, decode, stream).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model kept requesting tools past the configured cap.
    #[error("agent '{agent}' exceeded {limit} tool rounds without a final answer")]
    ToolIterationLimit { agent: String, limit: u32 },
}

/// Registration failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a tool named '{0}' is already registered")]
    Duplicate(String),
}
