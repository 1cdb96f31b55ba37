//! Tool trait: the abstract interface every agent tool must implement.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use parley_core::types::ToolDefinition;

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The run loop sends tool schemas to the LLM via `to_definition()` and
/// dispatches calls through the [`ToolRegistry`](super::ToolRegistry), which
/// validates arguments against `parameters()` before calling `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by the LLM to call this tool (e.g. `"student_info_tool"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the LLM.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters (as a `serde_json::Value`).
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments.
    ///
    /// Returns the tool output as a string (the LLM reads this).
    /// On failure, return an `Err`; the registry will catch it and
    /// convert to an error string for the LLM.
    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String>;

    /// Build the `ToolDefinition` sent to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}

/// Extract a required integer param.
///
/// Integral floats such as `3.0` are accepted; some backends emit them.
pub fn require_i64(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<i64> {
    let value = params
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))?;

    as_exact_i64(value).ok_or_else(|| anyhow::anyhow!("Parameter {key} must be an integer"))
}

/// The value as an `i64`, if it is an integer that fits without loss.
///
/// Integral floats such as `3.0` count; `1e300` and `u64` values above
/// `i64::MAX` do not.
pub fn as_exact_i64(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if value.is_u64() {
        return None;
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_string_present() {
        let mut params = HashMap::new();
        params.insert("location".into(), json!("Karachi"));
        assert_eq!(require_string(&params, "location").unwrap(), "Karachi");
    }

    #[test]
    fn test_require_string_missing() {
        let params = HashMap::new();
        assert!(require_string(&params, "location").is_err());
    }

    #[test]
    fn test_require_string_wrong_type() {
        let mut params = HashMap::new();
        params.insert("location".into(), json!(42));
        assert!(require_string(&params, "location").is_err());
    }

    #[test]
    fn test_require_i64() {
        let mut params = HashMap::new();
        params.insert("student_id".into(), json!(3));
        assert_eq!(require_i64(&params, "student_id").unwrap(), 3);

        params.insert("student_id".into(), json!(4.0));
        assert_eq!(require_i64(&params, "student_id").unwrap(), 4);

        params.insert("student_id".into(), json!(2.5));
        assert!(require_i64(&params, "student_id").is_err());

        params.insert("student_id".into(), json!("1"));
        assert!(require_i64(&params, "student_id").is_err());
    }

    #[test]
    fn test_require_i64_rejects_out_of_range() {
        let mut params = HashMap::new();
        params.insert("student_id".into(), json!(u64::MAX));
        let err = require_i64(&params, "student_id").unwrap_err();
        assert_eq!(err.to_string(), "Parameter student_id must be an integer");

        params.insert("student_id".into(), json!(1e300));
        assert!(require_i64(&params, "student_id").is_err());

        params.insert("student_id".into(), json!(-1e19));
        assert!(require_i64(&params, "student_id").is_err());

        params.insert("student_id".into(), json!(i64::MAX));
        assert_eq!(require_i64(&params, "student_id").unwrap(), i64::MAX);
    }

    /// Verify the default `to_definition()` produces the right shape.
    #[tokio::test]
    async fn test_to_definition_default() {
        struct DummyTool;

        #[async_trait]
        impl Tool for DummyTool {
            fn name(&self) -> &str { "dummy" }
            fn description(&self) -> &str { "A test tool" }
            fn parameters(&self) -> Value {
                json!({
                    "type": "object",
                    "properties": {
                        "msg": { "type": "string" }
                    },
                    "required": ["msg"]
                })
            }
            async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
                Ok("ok".into())
            }
        }

        let def = DummyTool.to_definition();
        assert_eq!(def.function.name, "dummy");
        assert_eq!(def.function.description, "A test tool");
        assert_eq!(def.tool_type, "function");
    }
}
