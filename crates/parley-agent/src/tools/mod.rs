//! Tool modules for Parley agents.

pub mod base;
pub mod essay;
pub mod registry;
pub mod student;
pub mod weather;

pub use base::{require_i64, require_string, Tool};
pub use essay::EssayWriterTool;
pub use registry::ToolRegistry;
pub use student::StudentInfoTool;
pub use weather::WeatherTool;
