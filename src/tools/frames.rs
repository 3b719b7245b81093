//! `extract_video_frames`: local video to encoded frames.

use super::result::ToolResult;
use super::tool::{Tool, ToolInput, ToolName};
use crate::error::{FormcheckError, Result};
use crate::media::{plan_samples, SampleFrames, SampleRequest, MAX_FRAMES};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
struct FramesInput {
    video_path: String,
    #[serde(default, deserialize_with = "whole_number")]
    num_frames: Option<i64>,
    #[serde(default)]
    positions: Option<Vec<f64>>,
}

impl ToolInput for FramesInput {
    fn check(&self) -> std::result::Result<(), String> {
        if self.video_path.trim().is_empty() {
            return Err("video_path must not be empty".into());
        }

        // num_frames is ignored when positions are given
        let Some(positions) = &self.positions else {
            return match self.num_frames {
                Some(n) if n < 1 || n > i64::from(MAX_FRAMES) => {
                    Err(format!("num_frames must be between 1 and {}", MAX_FRAMES))
                }
                _ => Ok(()),
            };
        };

        if positions.is_empty() {
            return Err("positions must not be empty when given".into());
        }
        if positions.len() > MAX_FRAMES as usize {
            return Err(format!("at most {} positions may be given", MAX_FRAMES));
        }
        if let Some(bad) = positions
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
        {
            return Err(format!("position {} is outside 0.0-1.0", bad));
        }

        Ok(())
    }
}

/// Accepts `5` and `5.0` alike; rejects fractional counts.
fn whole_number<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(n) if n.fract() == 0.0 && n.abs() <= i64::MAX as f64 => Ok(Some(n as i64)),
        Some(n) => Err(serde::de::Error::custom(format!(
            "num_frames must be a whole number, got {}",
            n
        ))),
    }
}

/// Success fields; `frames_data` is exactly what `analyze_sport_technique` requires.
#[derive(Debug, Serialize)]
struct ExtractedFrames {
    frames_data: Vec<String>,
    frame_count: usize,
    positions: Vec<f64>,
}

/// Samples frames from a downloaded video.
pub struct ExtractFramesTool {
    sampler: Arc<dyn SampleFrames>,
    default_count: u32,
}

impl ExtractFramesTool {
    pub fn new(sampler: Arc<dyn SampleFrames>, default_count: u32) -> Self {
        Self {
            sampler,
            default_count: default_count.clamp(1, MAX_FRAMES),
        }
    }

    async fn extract(&self, path: &Path, request: SampleRequest) -> Result<ExtractedFrames> {
        ensure_readable(path).await?;

        let duration = self.sampler.probe_duration(path).await?;
        let plan = plan_samples(duration, &request)?;

        info!(
            "Extracting {} frame(s) from {:.1}s of video",
            plan.points.len(),
            duration
        );

        let mut frames_data = Vec::with_capacity(plan.points.len());
        for point in &plan.points {
            frames_data.push(self.sampler.encode_frame(path, point.at_seconds).await?);
        }

        Ok(ExtractedFrames {
            frame_count: frames_data.len(),
            positions: plan.positions(),
            frames_data,
        })
    }
}

/// Fails unless `path` is a regular file this process can open.
async fn ensure_readable(path: &Path) -> Result<()> {
    let unreadable = |reason: String| {
        FormcheckError::UnreadableMedia(format!("{}: {}", path.display(), reason))
    };

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    if !metadata.is_file() {
        return Err(unreadable("not a regular file".into()));
    }

    tokio::fs::File::open(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl Tool for ExtractFramesTool {
    fn name(&self) -> ToolName {
        ToolName::ExtractVideoFrames
    }

    #[instrument(skip(self, args))]
    async fn call(&self, args: Map<String, Value>) -> Result<ToolResult> {
        let input = match FramesInput::parse(args) {
            Ok(input) => input,
            Err(e) => return Ok(ToolResult::from_error(&e)),
        };

        let request = match input.positions {
            Some(positions) => SampleRequest::Positions(positions),
            None => SampleRequest::Count(input.num_frames.map_or(self.default_count, |n| n as u32)),
        };

        match self.extract(Path::new(&input.video_path), request).await {
            Ok(frames) => ToolResult::success(&frames),
            Err(e) => {
                warn!("Frame extraction failed: {}", e);
                Ok(ToolResult::from_error(&e))
            }
        }
    }
}
