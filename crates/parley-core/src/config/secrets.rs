//! Required environment: backend credentials and the weather API.
//!
//! Every variable is mandatory. The first one that is absent (or empty)
//! aborts startup with [`ConfigError::MissingEnv`].

use super::ConfigError;

pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GEMINI_API_URL: &str = "GEMINI_API_URL";
pub const GEMINI_API_MODEL: &str = "GEMINI_API_MODEL";
pub const WEATHER_API_URL: &str = "WEATHER_API_URL";
pub const WEATHER_API_KEY: &str = "WEATHER_API_KEY";

/// All required variables, in the order they are checked.
pub const REQUIRED_VARS: [&str; 5] = [
    GEMINI_API_KEY,
    GEMINI_API_URL,
    GEMINI_API_MODEL,
    WEATHER_API_URL,
    WEATHER_API_KEY,
];

/// Process-wide credentials, read once at startup and never mutated.
#[derive(Clone)]
pub struct Secrets {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub weather_api_url: String,
    pub weather_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("weather_api_url", &self.weather_api_url)
            .finish_non_exhaustive()
    }
}

impl Secrets {
    /// Read secrets from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read secrets through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(name))
        };

        Ok(Secrets {
            api_key: require(GEMINI_API_KEY)?,
            api_url: require(GEMINI_API_URL)?,
            model: require(GEMINI_API_MODEL)?,
            weather_api_url: require(WEATHER_API_URL)?,
            weather_api_key: require(WEATHER_API_KEY)?,
        })
    }
}

/// Mask a secret for display, keeping only its last four characters.
pub fn mask(value: &str) -> String {
    let count = value.chars().count();
    if count <= 4 {
        "*".repeat(count)
    } else {
        let tail: String = value.chars().skip(count - 4).collect();
        format!("{}{}", "*".repeat(count - 4), tail)
    }
}
