//! Parley core: message types, configuration, history, and transcripts.

pub mod config;
pub mod session;
pub mod types;
pub mod utils;
