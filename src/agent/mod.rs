//! Agent loop that lets a reasoning model drive the tool chain.
//!
//! The model receives the tool contract table as its available actions;
//! every tool call it makes goes through the [`ToolExecutor`](crate::tools::ToolExecutor)
//! and the serialized [`ToolResult`](crate::tools::ToolResult) is returned to
//! it as the tool message.

mod runner;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{tool_definition, tool_definitions};
