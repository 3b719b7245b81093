//! Tool-chaining core.
//!
//! Three tools form a forward chain: each success payload carries exactly the
//! field the next tool requires.
//!
//! ```text
//! download_youtube_video  { url }          -> { video_path }
//! extract_video_frames    { video_path }   -> { frames_data, frame_count }
//! analyze_sport_technique { frames_data,
//!                           analysis_prompt } -> { analysis, token_usage }
//! ```
//!
//! [`ToolExecutor`] is the only entry point an agent loop needs: it resolves
//! the name through a [`ToolRegistry`], validates the arguments against the
//! [`ToolSchema`] table, and folds every outcome into a [`ToolResult`].

mod analyze;
mod download;
mod executor;
mod frames;
mod registry;
mod result;
mod schema;
mod tool;

#[cfg(test)]
pub(crate) mod testing;

pub use analyze::AnalyzeTechniqueTool;
pub use download::DownloadVideoTool;
pub use executor::ToolExecutor;
pub use frames::ExtractFramesTool;
pub use registry::ToolRegistry;
pub use result::ToolResult;
pub use schema::{schema_for, tool_schemas, ParamSpec, ParamType, ToolSchema};
pub use tool::{Tool, ToolInput, ToolName};
