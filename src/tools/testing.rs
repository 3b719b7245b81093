//! Test doubles for the external actions.

use crate::error::{FormcheckError, Result};
use crate::media::{FetchMedia, MediaHandle, SampleFrames};
use crate::vision::{CritiqueFrames, CritiqueReport, CritiqueRequest, TokenUsage};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;
use url::Url;

/// A small file standing in for a downloaded video.
pub(crate) fn video_file() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    std::fs::write(&path, b"fake video").unwrap();
    let path = path.to_string_lossy().to_string();
    (dir, path)
}

enum FetchBehavior {
    Write(Vec<u8>),
    Fail(String),
    Phantom,
}

pub(crate) struct StubFetcher {
    behavior: FetchBehavior,
    calls: AtomicUsize,
}

impl StubFetcher {
    /// Writes `bytes` to `<dest>/clip.mp4`.
    pub fn writing(bytes: &[u8]) -> Self {
        Self::with(FetchBehavior::Write(bytes.to_vec()))
    }

    /// Fails like a network error.
    pub fn failing(message: &str) -> Self {
        Self::with(FetchBehavior::Fail(message.to_string()))
    }

    /// Claims success for a file that does not exist.
    pub fn phantom() -> Self {
        Self::with(FetchBehavior::Phantom)
    }

    fn with(behavior: FetchBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchMedia for StubFetcher {
    async fn fetch(&self, _url: &Url, dest_dir: &Path) -> Result<MediaHandle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let path = dest_dir.join("clip.mp4");
        match &self.behavior {
            FetchBehavior::Write(bytes) => {
                std::fs::create_dir_all(dest_dir)?;
                std::fs::write(&path, bytes)?;
                MediaHandle::from_path(path).await
            }
            FetchBehavior::Fail(message) => Err(FormcheckError::Download(message.clone())),
            FetchBehavior::Phantom => Ok(MediaHandle {
                path: PathBuf::from("/nonexistent/formcheck/clip.mp4"),
                size_bytes: 1,
            }),
        }
    }
}

/// Encodes each frame as `frame@<seconds>` and records the instants.
pub(crate) struct StubSampler {
    duration: f64,
    fail_decode: bool,
    calls: AtomicUsize,
    sampled: Mutex<Vec<f64>>,
}

impl StubSampler {
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration,
            fail_decode: false,
            calls: AtomicUsize::new(0),
            sampled: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_decode(duration: f64) -> Self {
        Self {
            fail_decode: true,
            ..Self::with_duration(duration)
        }
    }

    /// Probe and decode calls combined.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sampled_at(&self) -> Vec<f64> {
        self.sampled.lock().unwrap().clone()
    }
}

#[async_trait]
impl SampleFrames for StubSampler {
    async fn probe_duration(&self, _path: &Path) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.duration)
    }

    async fn encode_frame(&self, _path: &Path, at_seconds: f64) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_decode {
            return Err(FormcheckError::FrameExtraction("codec not supported".into()));
        }
        self.sampled.lock().unwrap().push(at_seconds);
        Ok(format!("frame@{:.1}", at_seconds))
    }
}

pub(crate) struct StubCritic {
    report: Option<CritiqueReport>,
    error: Mutex<Option<FormcheckError>>,
    calls: AtomicUsize,
    last: Mutex<Option<CritiqueRequest>>,
}

impl StubCritic {
    pub fn replying(analysis: &str, input: u32, output: u32) -> Self {
        Self {
            report: Some(CritiqueReport {
                analysis: analysis.to_string(),
                token_usage: TokenUsage { input, output },
            }),
            error: Mutex::new(None),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    /// Returns `error` on the first call and a generic backend error afterwards.
    pub fn failing(error: FormcheckError) -> Self {
        Self {
            report: None,
            error: Mutex::new(Some(error)),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CritiqueRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl CritiqueFrames for StubCritic {
    async fn critique(&self, request: &CritiqueRequest) -> Result<CritiqueReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());

        if let Some(report) = &self.report {
            return Ok(report.clone());
        }
        Err(self
            .error
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| FormcheckError::Vision("backend unavailable".into())))
    }
}
