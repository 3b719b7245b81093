//! Frame decoding via ffprobe and ffmpeg.

use super::{run_program, SampleFrames};
use crate::config::FrameSettings;
use crate::error::{FormcheckError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Samples JPEG frames with ffmpeg.
pub struct FfmpegSampler {
    max_width: u32,
    jpeg_quality: u32,
}

impl FfmpegSampler {
    pub fn new(max_width: u32, jpeg_quality: u32) -> Self {
        Self {
            max_width: max_width.max(16),
            jpeg_quality: jpeg_quality.clamp(2, 31),
        }
    }

    pub fn from_settings(settings: &FrameSettings) -> Self {
        Self::new(settings.max_width, settings.jpeg_quality)
    }

    /// ffmpeg filter that shrinks wide frames and keeps the height even.
    fn scale_filter(&self) -> String {
        format!("scale='min({},iw)':-2", self.max_width)
    }
}

impl Default for FfmpegSampler {
    fn default() -> Self {
        Self::from_settings(&FrameSettings::default())
    }
}

#[async_trait]
impl SampleFrames for FfmpegSampler {
    /// Queries the duration using ffprobe with JSON output.
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn probe_duration(&self, path: &Path) -> Result<f64> {
        let mut command = Command::new("ffprobe");
        command
            .arg("-v").arg("error")
            .arg("-print_format").arg("json")
            .arg("-show_format")
            .arg(path)
            .stdin(Stdio::null());

        let output = run_program("ffprobe", &mut command, FormcheckError::FrameExtraction).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FormcheckError::FrameExtraction(format!(
                "ffprobe could not decode {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn encode_frame(&self, path: &Path, at_seconds: f64) -> Result<String> {
        debug!("Decoding frame at {:.3}s", at_seconds);

        let mut command = Command::new("ffmpeg");
        command
            .arg("-ss").arg(format!("{:.3}", at_seconds))
            .arg("-i").arg(path)
            .arg("-frames:v").arg("1")
            .arg("-vf").arg(self.scale_filter())
            .arg("-q:v").arg(self.jpeg_quality.to_string())
            .arg("-f").arg("image2pipe")
            .arg("-vcodec").arg("mjpeg")
            .arg("-loglevel").arg("error")
            .arg("pipe:1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = run_program("ffmpeg", &mut command, FormcheckError::FrameExtraction).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FormcheckError::FrameExtraction(format!(
                "ffmpeg failed at {:.3}s: {}",
                at_seconds,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(FormcheckError::FrameExtraction(format!(
                "no frame decoded at {:.3}s",
                at_seconds
            )));
        }

        Ok(STANDARD.encode(&output.stdout))
    }
}

/// Extract `format.duration` from ffprobe's JSON output.
fn parse_duration(json_str: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|_| FormcheckError::FrameExtraction("Invalid ffprobe output".into()))?;

    let duration = parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| {
            FormcheckError::FrameExtraction("Could not determine video duration".into())
        })?;

    if duration <= 0.0 {
        return Err(FormcheckError::FrameExtraction("zero-duration media".into()));
    }

    Ok(duration)
}
