//! Weather tool: current conditions from a WeatherAPI-style REST endpoint.
//!
//! `GET {base}/current.json?key=…&q=…`, answered with a single sentence the
//! model can quote back to the user.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Number, Value};
use tracing::{debug, warn};

use super::base::{require_string, Tool};

pub const WEATHER_TOOL_NAME: &str = "current_weather_tool";

// ─────────────────────────────────────────────
// Payload
// ─────────────────────────────────────────────

/// The subset of the `current.json` response the sentence is built from.
///
/// Numbers stay as [`Number`] so they print exactly as the API sent them.
#[derive(Debug, Deserialize)]
struct WeatherPayload {
    location: Location,
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
    region: String,
    country: String,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_c: Number,
    feelslike_c: Number,
    condition: Condition,
    wind_kph: Number,
    wind_dir: String,
    humidity: Number,
    uv: Number,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

impl WeatherPayload {
    fn describe(&self) -> String {
        let (loc, cur) = (&self.location, &self.current);
        format!(
            "Current weather in {}, {}, {} as of {} is {}°C ({}), feels like {}°C, wind {} km/h {}, humidity {}% and UV index is {}.",
            loc.name,
            loc.region,
            loc.country,
            loc.localtime,
            cur.temp_c,
            cur.condition.text,
            cur.feelslike_c,
            cur.wind_kph,
            cur.wind_dir,
            cur.humidity,
            cur.uv,
        )
    }
}

/// The sentence returned whenever the upstream API cannot be reached or
/// answers with a non-success status.
pub fn weather_error_message(location: &str) -> String {
    format!("Error fetching weather data for {location}. Please try again later.")
}

// ─────────────────────────────────────────────
// WeatherTool
// ─────────────────────────────────────────────

/// Fetches the current weather for a location.
pub struct WeatherTool {
    client: Client,
    api_url: String,
    api_key: String,
}

impl WeatherTool {
    /// Create a weather tool against `api_url` (e.g. `https://api.weatherapi.com/v1`).
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build weather HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/current.json", self.api_url.trim_end_matches('/'))
    }

    /// Look up `location`. Upstream failures become the fixed error sentence;
    /// a payload missing documented fields is an `Err`.
    pub async fn fetch_weather(&self, location: &str) -> anyhow::Result<String> {
        debug!(location = %location, "fetching weather");

        let response = match self
            .client
            .get(self.endpoint())
            .query(&[("key", self.api_key.as_str()), ("q", location)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(location = %location, error = %e, "weather request failed");
                return Ok(weather_error_message(location));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(location = %location, status = %status, "weather API returned error status");
            return Ok(weather_error_message(location));
        }

        let body = response
            .text()
            .await
            .context("failed to read weather response body")?;
        let payload: WeatherPayload =
            serde_json::from_str(&body).context("unexpected weather API payload")?;

        Ok(payload.describe())
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Retrieves current weather information for a specified location, including temperature, conditions, wind, humidity and UV index."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City name, coordinates, or other location identifier supported by the weather API"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let location = require_string(&params, "location")?;
        self.fetch_weather(&location).await
    }
}
