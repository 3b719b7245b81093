//! `download_youtube_video`: URL to local video file.

use super::result::ToolResult;
use super::tool::{Tool, ToolInput, ToolName};
use crate::config::Settings;
use crate::error::Result;
use crate::media::{FetchMedia, MediaHandle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct DownloadInput {
    url: String,
    #[serde(default)]
    output_dir: Option<String>,
}

impl ToolInput for DownloadInput {
    fn check(&self) -> std::result::Result<(), String> {
        parse_media_url(&self.url).map(|_| ())?;
        if self.output_dir.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err("output_dir must not be empty".into());
        }
        Ok(())
    }
}

/// Accepts absolute http(s) URLs with a host.
fn parse_media_url(raw: &str) -> std::result::Result<Url, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("url must not be empty".into());
    }

    let url = Url::parse(raw).map_err(|e| format!("invalid URL '{}': {}", raw, e))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "invalid URL '{}': expected an http(s) video URL",
            raw
        ));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(format!("invalid URL '{}': missing host", raw));
    }

    Ok(url)
}

/// Success fields; `video_path` is exactly what `extract_video_frames` requires.
#[derive(Debug, Serialize)]
struct Downloaded {
    video_path: String,
    size_bytes: u64,
}

/// Downloads a video into a local directory.
pub struct DownloadVideoTool {
    fetcher: Arc<dyn FetchMedia>,
    default_output_dir: PathBuf,
}

impl DownloadVideoTool {
    pub fn new(fetcher: Arc<dyn FetchMedia>, default_output_dir: PathBuf) -> Self {
        Self {
            fetcher,
            default_output_dir,
        }
    }
}

#[async_trait]
impl Tool for DownloadVideoTool {
    fn name(&self) -> ToolName {
        ToolName::DownloadYoutubeVideo
    }

    async fn call(&self, args: Map<String, Value>) -> Result<ToolResult> {
        let input = match DownloadInput::parse(args) {
            Ok(input) => input,
            Err(e) => return Ok(ToolResult::from_error(&e)),
        };

        let url = match parse_media_url(&input.url) {
            Ok(url) => url,
            Err(e) => return Ok(ToolResult::failure(format!("Invalid input: {}", e))),
        };

        let dest = input
            .output_dir
            .as_deref()
            .map(Settings::expand_path)
            .unwrap_or_else(|| self.default_output_dir.clone());

        info!("Downloading {} into {}", url, dest.display());

        let fetched = match self.fetcher.fetch(&url, &dest).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Download failed: {}", e);
                return Ok(ToolResult::from_error(&e));
            }
        };

        // Never hand out a path that is missing or empty, whatever the fetcher claims.
        let handle = match MediaHandle::from_path(&fetched.path).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Fetcher returned an unusable file: {}", e);
                return Ok(ToolResult::from_error(&e));
            }
        };

        ToolResult::success(&Downloaded {
            video_path: handle.path.to_string_lossy().to_string(),
            size_bytes: handle.size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::StubFetcher;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_media_url() {
        assert!(parse_media_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
        assert!(parse_media_url("https://example.com/watch?v=abc").is_ok());
        assert!(parse_media_url("  http://example.com/v.mp4 ").is_ok());

        assert_eq!(parse_media_url("").unwrap_err(), "url must not be empty");
        assert!(parse_media_url("not a url").unwrap_err().contains("invalid URL"));
        assert!(parse_media_url("ftp://example.com/v.mp4")
            .unwrap_err()
            .contains("expected an http(s) video URL"));
        assert!(parse_media_url("file:///tmp/v.mp4").is_err());
    }

    #[tokio::test]
    async fn test_download_success() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(StubFetcher::writing(b"video"));
        let tool = DownloadVideoTool::new(fetcher.clone(), dir.path().to_path_buf());

        let result = tool
            .call(args(json!({"url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"})))
            .await
            .unwrap();

        assert!(result.is_success(), "{result}");
        let path = result.get("video_path").and_then(Value::as_str).unwrap();
        assert!(path.starts_with(dir.path().to_str().unwrap()));
        assert!(std::path::Path::new(path).exists());
        assert_eq!(result.get("size_bytes"), Some(&json!(5)));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_output_dir_overrides_default() {
        let default_dir = tempfile::tempdir().unwrap();
        let chosen_dir = tempfile::tempdir().unwrap();
        let tool = DownloadVideoTool::new(
            Arc::new(StubFetcher::writing(b"video")),
            default_dir.path().to_path_buf(),
        );

        let result = tool
            .call(args(json!({
                "url": "https://example.com/clip",
                "output_dir": chosen_dir.path().to_str().unwrap(),
            })))
            .await
            .unwrap();

        let path = result.get("video_path").and_then(Value::as_str).unwrap();
        assert!(path.starts_with(chosen_dir.path().to_str().unwrap()));
    }

    #[tokio::test]
    async fn test_network_failure_is_structured() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(StubFetcher::failing("connection refused"));
        let tool = DownloadVideoTool::new(fetcher.clone(), dir.path().to_path_buf());

        let result = tool
            .call(args(json!({"url": "https://example.com/watch?v=abc"})))
            .await
            .unwrap();

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("connection refused"));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(StubFetcher::writing(b"video"));
        let tool = DownloadVideoTool::new(fetcher.clone(), dir.path().to_path_buf());

        for bad in [json!({"url": ""}), json!({"url": "ftp://x/y"}), json!({})] {
            let result = tool.call(args(bad)).await.unwrap();
            assert!(result.error().unwrap().starts_with("Invalid input"));
        }
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_from_fetcher_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tool = DownloadVideoTool::new(
            Arc::new(StubFetcher::phantom()),
            dir.path().to_path_buf(),
        );

        let result = tool
            .call(args(json!({"url": "https://example.com/clip"})))
            .await
            .unwrap();

        assert!(result.error().unwrap().starts_with("Cannot read video file"));
    }
}
