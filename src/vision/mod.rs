//! Vision critique backend.
//!
//! [`CritiqueFrames`] is the narrow interface to a vision-capable model: one
//! call submits every frame plus an instruction and returns text together
//! with the backend's usage counters.

mod openai;

pub use openai::OpenAIVision;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single multi-modal critique request.
#[derive(Debug, Clone, PartialEq)]
pub struct CritiqueRequest {
    /// Base64-encoded frames in chronological order.
    pub frames: Vec<String>,
    /// What the caller wants analyzed.
    pub instruction: String,
    /// Sport hint for context.
    pub sport: String,
}

impl CritiqueRequest {
    /// Text part sent alongside the images.
    pub fn prompt_text(&self) -> String {
        format!(
            "Sport: {}\n\nThe {} attached frame(s) are stills from one video, in chronological order.\n\n{}",
            self.sport,
            self.frames.len(),
            self.instruction
        )
    }
}

/// Backend-reported consumption for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u32,
    pub output: u32,
}

/// Result of a critique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueReport {
    pub analysis: String,
    pub token_usage: TokenUsage,
}

/// Submits frames to a vision model.
#[async_trait]
pub trait CritiqueFrames: Send + Sync {
    async fn critique(&self, request: &CritiqueRequest) -> Result<CritiqueReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_text() {
        let request = CritiqueRequest {
            frames: vec!["a".into(), "b".into(), "c".into()],
            instruction: "list 3 observations".into(),
            sport: "table tennis".into(),
        };
        let text = request.prompt_text();
        assert!(text.starts_with("Sport: table tennis"));
        assert!(text.contains("The 3 attached frame(s)"));
        assert!(text.ends_with("list 3 observations"));
    }

    #[test]
    fn test_report_serializes_flat() {
        let report = CritiqueReport {
            analysis: "Good form".into(),
            token_usage: TokenUsage { input: 10, output: 5 },
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({"analysis": "Good form", "token_usage": {"input": 10, "output": 5}})
        );
    }
}
