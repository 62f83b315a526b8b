pub mod loop_;
pub mod prompt;
pub mod registry;

pub use loop_::{AgentOutput, AgentStep, Context7Agent, DEFAULT_MAX_STEPS, FinishReason};
pub use prompt::DEFAULT_SYSTEM_PROMPT;
pub use registry::ToolRegistry;
