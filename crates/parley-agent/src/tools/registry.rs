//! Tool Registry: the closed set of tools one agent may call.
//!
//! The run loop registers tools here and dispatches LLM tool-call requests
//! by name. Arguments are checked against each tool's declared schema before
//! the handler runs, and every outcome comes back as a `String`.

use std::collections::HashMap;
use std::sync::Arc;

use parley_core::types::ToolDefinition;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::base::{as_exact_i64, Tool};
use crate::error::RegistryError;

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools in registration order and dispatches calls.
///
/// Owns `Arc<dyn Tool>` so tools can be shared across threads.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Names must be unique within a registry.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        if self.has(tool.name()) {
            return Err(RegistryError::Duplicate(tool.name().to_string()));
        }
        info!(tool = tool.name(), "registered tool");
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// LLM-facing definitions for all registered tools, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool by name with the raw JSON argument string the model sent.
    ///
    /// The LLM always gets a `String` back, even on failure.
    pub async fn execute(&self, name: &str, raw_args: &str) -> String {
        let tool = match self.get(name) {
            Some(t) => t,
            None => {
                warn!(tool = name, "tool not found");
                return format!("Error: Tool '{name}' not found");
            }
        };

        let params = match parse_arguments(raw_args, &tool.parameters()) {
            Ok(p) => p,
            Err(reason) => {
                warn!(tool = name, reason = %reason, "rejected tool arguments");
                return format!("Error: Invalid arguments for {name}: {reason}");
            }
        };

        debug!(tool = name, "dispatching tool");
        match tool.execute(params).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                format!("Error executing {name}: {e}")
            }
        }
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tools.iter().map(|t| t.name())).finish()
    }
}

// ─────────────────────────────────────────────
// Argument validation
// ─────────────────────────────────────────────

/// Parse the model's argument string and check it against `schema`.
///
/// Only the subset of JSON Schema the tools declare is enforced: the value
/// must be an object, every `required` key must be present, and declared
/// properties must match their primitive `type`. Blank input counts as `{}`.
fn parse_arguments(raw: &str, schema: &Value) -> Result<HashMap<String, Value>, String> {
    let value: Value = if raw.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(raw).map_err(|e| format!("arguments are not valid JSON ({e})"))?
    };

    let object = match value {
        Value::Object(map) => map,
        other => return Err(format!("expected a JSON object, got {}", json_type(&other))),
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(key) {
                return Err(format!("missing required property '{key}'"));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, value) in &object {
            let expected = properties
                .get(key)
                .and_then(|p| p.get("type"))
                .and_then(Value::as_str);
            if let Some(expected) = expected {
                if !matches_type(value, expected) {
                    return Err(format!(
                        "property '{key}' must be {expected}, got {}",
                        json_type(value)
                    ));
                }
            }
        }
    }

    Ok(object.into_iter().collect())
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => as_exact_i64(value).is_some(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
