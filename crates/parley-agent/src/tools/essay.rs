//! Essay tool: delegates the whole request to the essay-writer sub-agent.
//!
//! The sub-agent gets a fresh history holding only the topic, runs to
//! completion through the same [`Runner`], and its final answer becomes the
//! tool output.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parley_core::types::Message;
use serde_json::{json, Value};
use tracing::info;

use super::base::{require_string, Tool};
use crate::agent::AgentConfig;
use crate::runner::Runner;

pub const ESSAY_TOOL_NAME: &str = "essay_writer_tool";

/// Exposes an agent as a callable tool.
pub struct EssayWriterTool {
    runner: Arc<Runner>,
    agent: Arc<AgentConfig>,
}

impl EssayWriterTool {
    pub fn new(runner: Arc<Runner>, agent: Arc<AgentConfig>) -> Self {
        Self { runner, agent }
    }
}

#[async_trait]
impl Tool for EssayWriterTool {
    fn name(&self) -> &str {
        ESSAY_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Write a 1000 word essay on a given topic."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "The essay topic and any instructions for the writer"
                }
            },
            "required": ["input"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let input = require_string(&params, "input")?;
        info!(agent = %self.agent.name, topic_len = input.len(), "delegating to sub-agent");

        let history = [Message::user(input)];
        let essay = self.runner.run(&self.agent, &history).await?;
        Ok(essay)
    }
}
