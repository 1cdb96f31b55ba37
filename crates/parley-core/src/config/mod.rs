//! Configuration: required secrets from the environment plus optional
//! tunables from `~/.parley/config.json`.
//!
//! # Usage
//! ```no_run
//! use parley_core::config;
//!
//! let secrets = config::Secrets::from_env().expect("missing environment");
//! let cfg = config::load_config(None);
//! println!("Model: {} (max {} tool rounds)", secrets.model, cfg.agent.max_tool_iterations);
//! ```

pub mod loader;
pub mod schema;
pub mod secrets;

use thiserror::Error;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::Config;
pub use secrets::Secrets;

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("{0} is not set in the environment variables.")]
    MissingEnv(&'static str),

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
