//! Tool identifiers, the tool trait, and typed input parsing.

use super::result::ToolResult;
use super::schema::{schema_for, ToolSchema};
use crate::error::{FormcheckError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// The closed set of tools, in calling-chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    DownloadYoutubeVideo,
    ExtractVideoFrames,
    AnalyzeSportTechnique,
}

impl ToolName {
    /// Every tool, download first.
    pub const ALL: [ToolName; 3] = [
        ToolName::DownloadYoutubeVideo,
        ToolName::ExtractVideoFrames,
        ToolName::AnalyzeSportTechnique,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::DownloadYoutubeVideo => "download_youtube_video",
            ToolName::ExtractVideoFrames => "extract_video_frames",
            ToolName::AnalyzeSportTechnique => "analyze_sport_technique",
        }
    }

    /// Position in the calling chain.
    pub fn index(&self) -> usize {
        match self {
            ToolName::DownloadYoutubeVideo => 0,
            ToolName::ExtractVideoFrames => 1,
            ToolName::AnalyzeSportTechnique => 2,
        }
    }
}

impl std::str::FromStr for ToolName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool that can be invoked by name with JSON arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> ToolName;

    fn schema(&self) -> &'static ToolSchema {
        schema_for(self.name())
    }

    /// Run the tool.
    ///
    /// Expected failures (bad input, network, decode, backend) come back as
    /// `Ok(ToolResult::Failure)`; `Err` is reserved for faults the tool did
    /// not anticipate.
    async fn call(&self, args: Map<String, Value>) -> Result<ToolResult>;
}

/// Typed arguments for one tool.
pub trait ToolInput: DeserializeOwned {
    /// Semantic checks beyond what deserialization enforces.
    fn check(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Deserialize and check, reporting problems as [`FormcheckError::InvalidInput`].
    fn parse(args: Map<String, Value>) -> Result<Self> {
        let input: Self = serde_json::from_value(Value::Object(args))
            .map_err(|e| FormcheckError::InvalidInput(e.to_string()))?;
        input.check().map_err(FormcheckError::InvalidInput)?;
        Ok(input)
    }
}
