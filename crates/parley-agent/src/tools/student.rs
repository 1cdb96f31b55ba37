//! Student directory tool: a fixed, in-memory lookup by id.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::base::{require_i64, Tool};

pub const STUDENT_TOOL_NAME: &str = "student_info_tool";

/// One directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub name: &'static str,
    pub age: u32,
    pub major: &'static str,
}

/// The whole directory. Never changes at runtime.
pub const STUDENTS: [Student; 4] = [
    Student { id: 1, name: "John Doe", age: 20, major: "Computer Science" },
    Student { id: 2, name: "Jane Smith", age: 22, major: "Mathematics" },
    Student { id: 3, name: "Alice Johnson", age: 21, major: "Physics" },
    Student { id: 4, name: "Bob Brown", age: 23, major: "Chemistry" },
];

/// Describe student `id`, or say that no such student exists.
pub fn lookup_student(id: i64) -> String {
    match STUDENTS.iter().find(|s| s.id == id) {
        Some(s) => format!(
            "Student ID: {}, Name: {}, Age: {}, Major: {}.",
            s.id, s.name, s.age, s.major
        ),
        None => format!("No student found with ID {id}."),
    }
}

/// Exposes [`lookup_student`] to the model.
#[derive(Debug, Default)]
pub struct StudentInfoTool;

#[async_trait]
impl Tool for StudentInfoTool {
    fn name(&self) -> &str {
        STUDENT_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get information about a student by their ID."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "student_id": {
                    "type": "integer",
                    "description": "Numeric student ID"
                }
            },
            "required": ["student_id"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let id = require_i64(&params, "student_id")?;
        Ok(lookup_student(id))
    }
}
