//! Configuration settings for Formcheck.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub download: DownloadSettings,
    pub frames: FrameSettings,
    pub vision: VisionSettings,
    pub agent: AgentSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Scratch directory used when a download does not name one.
    pub scratch_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir().to_string_lossy().to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Video download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// yt-dlp format selector.
    pub format: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            format: "bv*[ext=mp4]+ba[ext=m4a]/b[ext=mp4]/b".to_string(),
        }
    }
}

/// Frame sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    /// Frames sampled when a call does not ask for a specific count.
    pub default_count: u32,
    /// Frames wider than this are scaled down (keeps aspect ratio).
    pub max_width: u32,
    /// JPEG quality passed to ffmpeg's `-q:v` (2 = best, 31 = worst).
    pub jpeg_quality: u32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            default_count: 5,
            max_width: 640,
            jpeg_quality: 4,
        }
    }
}

/// Image detail level requested from the vision model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetailLevel {
    #[default]
    Auto,
    Low,
    High,
}

impl std::str::FromStr for ImageDetailLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ImageDetailLevel::Auto),
            "low" => Ok(ImageDetailLevel::Low),
            "high" => Ok(ImageDetailLevel::High),
            _ => Err(format!("Unknown image detail level: {}", s)),
        }
    }
}

impl std::fmt::Display for ImageDetailLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageDetailLevel::Auto => write!(f, "auto"),
            ImageDetailLevel::Low => write!(f, "low"),
            ImageDetailLevel::High => write!(f, "high"),
        }
    }
}

/// Vision backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    /// Vision-capable chat model.
    pub model: String,
    /// Upper bound on the critique length.
    pub max_tokens: u32,
    /// Sport hint used when a call does not give one.
    pub default_sport: String,
    /// Image detail level.
    pub detail: ImageDetailLevel,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 1024,
            default_sport: "general".to_string(),
            detail: ImageDetailLevel::Auto,
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Model that decides which tool to call next.
    pub model: String,
    /// Maximum LLM round trips per task.
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_iterations: 10,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::FormcheckError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("formcheck")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded scratch directory path.
    pub fn scratch_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.scratch_dir)
    }
}
