//! Client SDK and LLM tool adapters for the Context7 documentation API.
//!
//! [`client::Context7Client`] wraps the two remote operations (library search
//! and paginated documentation retrieval). [`tools`] exposes them to a
//! tool-calling model and [`agent::Context7Agent`] drives that model.

pub mod agent;
pub mod client;
pub mod config;
pub mod providers;
pub mod tools;
pub mod traits;

pub use agent::{AgentOutput, AgentStep, Context7Agent, FinishReason, ToolRegistry};
pub use client::{
    ClientConfig, Context7Client, Context7Error, Docs, DocsFormat, DocsMode, DocsOptions,
    LibraryId,
};
pub use config::Config;
pub use providers::{OpenAIProvider, create_provider};
pub use tools::{GetLibraryDocsTool, ResolveLibraryTool, context7_tools};
pub use traits::*;
