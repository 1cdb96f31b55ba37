//! Config loader: reads `~/.parley/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.parley/config.json`
//! 3. Environment variables `PARLEY_<SECTION>__<FIELD>` (override JSON)
//!
//! Tunables are never fatal: a broken file logs a warning and the defaults
//! are used instead.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;
use super::ConfigError;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) plus env vars.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<(), ConfigError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let wrap = |source: std::io::Error| ConfigError::Write {
        path: config_path.display().to_string(),
        source,
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| wrap(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

    std::fs::write(&config_path, json).map_err(wrap)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply process environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_with(config, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup`.
///
/// Supported overrides:
/// - `PARLEY_AGENT__MAX_TOOL_ITERATIONS` → `agent.max_tool_iterations`
/// - `PARLEY_AGENT__MAX_TOKENS` → `agent.max_tokens`
/// - `PARLEY_AGENT__TEMPERATURE` → `agent.temperature`
/// - `PARLEY_AGENT__STREAM` → `agent.stream`
/// - `PARLEY_HTTP__REQUEST_TIMEOUT_SECS` → `http.request_timeout_secs`
/// - `PARLEY_HTTP__WEATHER_TIMEOUT_SECS` → `http.weather_timeout_secs`
/// - `PARLEY_TRANSCRIPT__PATH` → `transcript.path`
///
/// Values that fail to parse are ignored with a warning.
pub fn apply_overrides_with<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("PARLEY_AGENT__MAX_TOOL_ITERATIONS") {
        match val.parse::<u32>() {
            Ok(n) => config.agent.max_tool_iterations = n,
            Err(_) => warn!(var = "PARLEY_AGENT__MAX_TOOL_ITERATIONS", value = %val, "ignoring invalid override"),
        }
    }
    if let Some(val) = lookup("PARLEY_AGENT__MAX_TOKENS") {
        match val.parse::<u32>() {
            Ok(n) => config.agent.max_tokens = n,
            Err(_) => warn!(var = "PARLEY_AGENT__MAX_TOKENS", value = %val, "ignoring invalid override"),
        }
    }
    if let Some(val) = lookup("PARLEY_AGENT__TEMPERATURE") {
        match val.parse::<f64>() {
            Ok(t) => config.agent.temperature = t,
            Err(_) => warn!(var = "PARLEY_AGENT__TEMPERATURE", value = %val, "ignoring invalid override"),
        }
    }
    if let Some(val) = lookup("PARLEY_AGENT__STREAM") {
        config.agent.stream = val == "true" || val == "1";
    }
    if let Some(val) = lookup("PARLEY_HTTP__REQUEST_TIMEOUT_SECS") {
        match val.parse::<u64>() {
            Ok(n) => config.http.request_timeout_secs = n,
            Err(_) => warn!(var = "PARLEY_HTTP__REQUEST_TIMEOUT_SECS", value = %val, "ignoring invalid override"),
        }
    }
    if let Some(val) = lookup("PARLEY_HTTP__WEATHER_TIMEOUT_SECS") {
        match val.parse::<u64>() {
            Ok(n) => config.http.weather_timeout_secs = n,
            Err(_) => warn!(var = "PARLEY_HTTP__WEATHER_TIMEOUT_SECS", value = %val, "ignoring invalid override"),
        }
    }
    if let Some(val) = lookup("PARLEY_TRANSCRIPT__PATH") {
        config.transcript.path = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.agent.max_tool_iterations, 10);
        assert_eq!(config.http.request_timeout_secs, 120);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "agent": { "maxToolIterations": 3, "temperature": 0.2 },
            "transcript": { "path": "/tmp/out.json" }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.agent.max_tool_iterations, 3);
        assert_eq!(config.agent.temperature, 0.2);
        assert_eq!(config.transcript.path, "/tmp/out.json");
        // Default preserved
        assert_eq!(config.agent.max_tokens, 4096);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.agent.max_tool_iterations, 10);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.agent.stream = false;
        config.http.weather_timeout_secs = 5;

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert!(!reloaded.agent.stream);
        assert_eq!(reloaded.http.weather_timeout_secs, 5);
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["agent"].get("maxTokens").is_some());
        assert!(raw["agent"].get("max_tokens").is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_overrides_with(
            Config::default(),
            lookup_from(&[
                ("PARLEY_AGENT__MAX_TOOL_ITERATIONS", "4"),
                ("PARLEY_AGENT__STREAM", "0"),
                ("PARLEY_HTTP__REQUEST_TIMEOUT_SECS", "15"),
                ("PARLEY_TRANSCRIPT__PATH", "history/out.json"),
            ]),
        );
        assert_eq!(config.agent.max_tool_iterations, 4);
        assert!(!config.agent.stream);
        assert_eq!(config.http.request_timeout_secs, 15);
        assert_eq!(config.transcript.path, "history/out.json");
    }

    #[test]
    fn test_invalid_override_ignored() {
        let config = apply_overrides_with(
            Config::default(),
            lookup_from(&[
                ("PARLEY_AGENT__MAX_TOKENS", "lots"),
                ("PARLEY_AGENT__TEMPERATURE", "0.1"),
            ]),
        );
        assert_eq!(config.agent.max_tokens, 4096);
        assert_eq!(config.agent.temperature, 0.1);
    }
}
