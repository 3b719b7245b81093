//! Media acquisition and frame sampling.
//!
//! The two external actions that turn a URL into a set of encoded frames live
//! behind narrow traits so the tools can run against test doubles:
//!
//! - [`FetchMedia`] retrieves a video into a local directory.
//! - [`SampleFrames`] probes a local video and encodes single frames.
//!
//! The default implementations shell out to yt-dlp, ffprobe and ffmpeg.

mod fetch;
mod plan;
mod sample;

pub use fetch::YtDlpFetcher;
pub use plan::{
    even_positions, max_distinct_frames, plan_samples, SamplePlan, SamplePoint, SampleRequest,
    FRAME_STEP, MAX_FRAMES,
};
pub use sample::FfmpegSampler;

use crate::error::{FormcheckError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use url::Url;

/// A video that has been fully written to local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHandle {
    /// Location of the complete file.
    pub path: PathBuf,
    /// Size of the file in bytes.
    pub size_bytes: u64,
}

impl MediaHandle {
    /// Build a handle for an existing file, reading its size from disk.
    ///
    /// Fails if the path is missing, is not a regular file, or is empty, so a
    /// handle never points at a truncated download.
    pub async fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            FormcheckError::UnreadableMedia(format!("{}: {}", path.display(), e))
        })?;

        if !metadata.is_file() {
            return Err(FormcheckError::UnreadableMedia(format!(
                "{}: not a regular file",
                path.display()
            )));
        }

        if metadata.len() == 0 {
            return Err(FormcheckError::UnreadableMedia(format!(
                "{}: file is empty",
                path.display()
            )));
        }

        Ok(Self {
            path,
            size_bytes: metadata.len(),
        })
    }
}

/// Retrieves remote media into a local directory.
#[async_trait]
pub trait FetchMedia: Send + Sync {
    /// Download `url` into `dest_dir`.
    ///
    /// Implementations must either return a handle to a complete file or an
    /// error; a partial file must never be left at the returned location.
    async fn fetch(&self, url: &Url, dest_dir: &Path) -> Result<MediaHandle>;
}

/// Decodes frames out of a local video.
#[async_trait]
pub trait SampleFrames: Send + Sync {
    /// Total duration of the video in seconds.
    async fn probe_duration(&self, path: &Path) -> Result<f64>;

    /// Encode the frame shown at `at_seconds` as a base64 image string.
    async fn encode_frame(&self, path: &Path, at_seconds: f64) -> Result<String>;
}

/// Runs an external program, mapping a missing binary to [`FormcheckError::ToolNotFound`].
///
/// `on_error` wraps any other spawn failure into the caller's error variant.
pub(crate) async fn run_program(
    program: &str,
    command: &mut Command,
    on_error: fn(String) -> FormcheckError,
) -> Result<Output> {
    match command.output().await {
        Ok(output) => Ok(output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(FormcheckError::ToolNotFound(program.to_string()))
        }
        Err(e) => Err(on_error(format!("{program} execution failed: {e}"))),
    }
}
