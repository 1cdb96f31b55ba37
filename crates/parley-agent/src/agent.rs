//! Agent configuration: who the model is told it is, and what it may call.

use std::sync::Arc;

use tracing::info;

use crate::error::RegistryError;
use crate::runner::Runner;
use crate::tools::essay::EssayWriterTool;
use crate::tools::student::StudentInfoTool;
use crate::tools::weather::WeatherTool;
use crate::tools::ToolRegistry;

// ─────────────────────────────────────────────
// Prompts
// ─────────────────────────────────────────────

pub const CHATBOT_NAME: &str = "Chatbot";

pub const CHATBOT_INSTRUCTIONS: &str = "\
You are a friendly and informative assistant. You can answer general questions and provide specific information.
* For **weather inquiries**, you may fetch and share the current weather.
* For **student-related queries**, you can retrieve details using the student ID.
* For **essay writing**, you can retrieve an essay on a given topic.
* Use tools **only when necessary**, not by default.
* If a question falls outside essay writing, weather or student information, provide a helpful general response or ask for clarification.
* If you're unsure of the answer, say \"I don't know\" or ask for more details.";

pub const ESSAY_WRITER_NAME: &str = "Essay Writer";

pub const ESSAY_WRITER_INSTRUCTIONS: &str =
    "You are an expert essay writer. You can write 1000 word essays on various topics.";

// ─────────────────────────────────────────────
// AgentConfig
// ─────────────────────────────────────────────

/// One configured agent: instructions, model and tool set.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug)]
pub struct AgentConfig {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: ToolRegistry,
}

impl AgentConfig {
    /// An agent with no tools.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model: model.into(),
            tools: ToolRegistry::new(),
        }
    }

    /// Same agent with `tools` instead of an empty registry.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// The essay-writing sub-agent. It has no tools of its own.
    pub fn essay_writer(model: impl Into<String>) -> Self {
        Self::new(ESSAY_WRITER_NAME, ESSAY_WRITER_INSTRUCTIONS, model)
    }

    /// The primary chat agent with the weather, student and essay tools.
    ///
    /// The essay tool runs the essay sub-agent through `runner`.
    pub fn chatbot(
        runner: Arc<Runner>,
        model: impl Into<String>,
        weather: WeatherTool,
    ) -> Result<Self, RegistryError> {
        let model = model.into();
        let essay_agent = Arc::new(Self::essay_writer(model.clone()));

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(weather))?;
        tools.register(Arc::new(StudentInfoTool))?;
        tools.register(Arc::new(EssayWriterTool::new(runner, essay_agent)))?;

        info!(agent = CHATBOT_NAME, model = %model, tools = tools.len(), "agent configured");

        Ok(Self::new(CHATBOT_NAME, CHATBOT_INSTRUCTIONS, model).with_tools(tools))
    }
}
