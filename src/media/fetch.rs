//! Video download via yt-dlp.

use super::{run_program, FetchMedia, MediaHandle};
use crate::error::{FormcheckError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};
use url::Url;

/// Downloads videos with yt-dlp.
///
/// Each download runs in its own hidden staging directory inside the
/// destination. The finished file is renamed into the destination only after
/// yt-dlp exits successfully, and the staging directory is removed on every
/// path, so concurrent fetches into the same directory do not collide and a
/// failed fetch leaves nothing behind.
pub struct YtDlpFetcher {
    program: String,
    format: String,
    video_id_regex: Regex,
}

impl YtDlpFetcher {
    /// Create a fetcher using the given yt-dlp format selector.
    pub fn new(format: &str) -> Self {
        let video_id_regex = Regex::new(
            r"(?x)
            ^(?:https?://)?
            (?:www\.|m\.)?
            (?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|v/|shorts/)|youtu\.be/)
            ([a-zA-Z0-9_-]{11})
        ",
        )
        .expect("Invalid regex");

        Self {
            program: "yt-dlp".to_string(),
            format: format.to_string(),
            video_id_regex,
        }
    }

    /// Use a different yt-dlp executable (name on `PATH` or full path).
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// Extract the YouTube video ID, if this is a YouTube URL.
    fn youtube_id(&self, url: &Url) -> Option<String> {
        self.video_id_regex
            .captures(url.as_str())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Return a previously downloaded copy of this YouTube video, if any.
    async fn cached(&self, url: &Url, dest_dir: &Path) -> Option<MediaHandle> {
        let video_id = self.youtube_id(url)?;
        MediaHandle::from_path(dest_dir.join(format!("{}.mp4", video_id)))
            .await
            .ok()
    }

    async fn run_ytdlp(&self, url: &Url, staging: &Path) -> Result<()> {
        let template = staging.join("%(id)s.%(ext)s");

        let mut command = Command::new(&self.program);
        command
            .arg("--format")
            .arg(&self.format)
            .arg("--merge-output-format")
            .arg("mp4")
            .arg("--output")
            .arg(&template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(url.as_str())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let output = run_program(&self.program, &mut command, FormcheckError::Download).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FormcheckError::Download(format!(
                "yt-dlp failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new(&crate::config::DownloadSettings::default().format)
    }
}

#[async_trait]
impl FetchMedia for YtDlpFetcher {
    #[instrument(skip(self, dest_dir), fields(url = %url))]
    async fn fetch(&self, url: &Url, dest_dir: &Path) -> Result<MediaHandle> {
        tokio::fs::create_dir_all(dest_dir).await.map_err(|e| {
            FormcheckError::Download(format!(
                "Cannot create output directory {}: {}",
                dest_dir.display(),
                e
            ))
        })?;

        if let Some(handle) = self.cached(url, dest_dir).await {
            info!("Using cached video file");
            return Ok(handle);
        }

        let staging = tempfile::Builder::new()
            .prefix(".formcheck-")
            .tempdir_in(dest_dir)
            .map_err(|e| {
                FormcheckError::Download(format!(
                    "Cannot write to {}: {}",
                    dest_dir.display(),
                    e
                ))
            })?;

        info!("Downloading video from {}", url);
        self.run_ytdlp(url, staging.path()).await?;

        let downloaded = find_video_file(staging.path())?;
        let file_name = downloaded
            .file_name()
            .ok_or_else(|| FormcheckError::Download("Downloaded file has no name".into()))?;
        let target = dest_dir.join(file_name);

        debug!("Moving {:?} to {:?}", downloaded, target);
        tokio::fs::rename(&downloaded, &target).await.map_err(|e| {
            FormcheckError::Download(format!("Cannot move download into place: {e}"))
        })?;

        MediaHandle::from_path(target).await
    }
}

/// Locate the finished download inside a staging directory.
///
/// Leftover fragments (`.part`, `.ytdl`, `.temp`) are never returned; when
/// several complete files exist the largest one wins.
fn find_video_file(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| FormcheckError::Download(format!("Cannot read directory: {e}")))?;

    let mut best: Option<(u64, PathBuf)> = None;

    for entry in entries.flatten() {
        let path = entry.path();
        let is_fragment = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext, "part" | "ytdl" | "temp"))
            .unwrap_or(false);

        if is_fragment {
            continue;
        }

        let size = match entry.metadata() {
            Ok(m) if m.is_file() && m.len() > 0 => m.len(),
            _ => continue,
        };

        if best.as_ref().map_or(true, |(best_size, _)| size > *best_size) {
            best = Some((size, path));
        }
    }

    best.map(|(_, path)| path)
        .ok_or_else(|| FormcheckError::Download("Video file not found after download".into()))
}
