//! `analyze_sport_technique`: frames to a written critique.

use super::result::ToolResult;
use super::tool::{Tool, ToolInput, ToolName};
use crate::error::Result;
use crate::vision::{CritiqueFrames, CritiqueRequest};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct AnalyzeInput {
    frames_data: Vec<String>,
    analysis_prompt: String,
    #[serde(default)]
    sport_type: Option<String>,
}

impl ToolInput for AnalyzeInput {
    fn check(&self) -> std::result::Result<(), String> {
        if self.frames_data.is_empty() {
            return Err("frames_data must contain at least one frame".into());
        }
        if let Some(idx) = self.frames_data.iter().position(|f| f.trim().is_empty()) {
            return Err(format!("frames_data[{}] is empty", idx));
        }
        if self.analysis_prompt.trim().is_empty() {
            return Err("analysis_prompt must not be empty".into());
        }
        Ok(())
    }
}

/// Sends frames to a vision backend for a technique critique.
pub struct AnalyzeTechniqueTool {
    critic: Arc<dyn CritiqueFrames>,
    default_sport: String,
}

impl AnalyzeTechniqueTool {
    pub fn new(critic: Arc<dyn CritiqueFrames>, default_sport: &str) -> Self {
        Self {
            critic,
            default_sport: default_sport.to_string(),
        }
    }
}

#[async_trait]
impl Tool for AnalyzeTechniqueTool {
    fn name(&self) -> ToolName {
        ToolName::AnalyzeSportTechnique
    }

    async fn call(&self, args: Map<String, Value>) -> Result<ToolResult> {
        let input = match AnalyzeInput::parse(args) {
            Ok(input) => input,
            Err(e) => return Ok(ToolResult::from_error(&e)),
        };

        let sport = input
            .sport_type
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.default_sport.clone());

        let request = CritiqueRequest {
            frames: input.frames_data,
            instruction: input.analysis_prompt.trim().to_string(),
            sport,
        };

        info!(
            "Analyzing {} frame(s) for {}",
            request.frames.len(),
            request.sport
        );

        match self.critic.critique(&request).await {
            Ok(report) => ToolResult::success(&report),
            Err(e) => {
                warn!("Critique failed: {}", e);
                Ok(ToolResult::from_error(&e))
            }
        }
    }
}
