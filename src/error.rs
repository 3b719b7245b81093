//! Error types for Formcheck.

use thiserror::Error;

/// Library-level error type for Formcheck operations.
#[derive(Error, Debug)]
pub enum FormcheckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Video download failed: {0}")]
    Download(String),

    #[error("Cannot read video file: {0}")]
    UnreadableMedia(String),

    #[error("Frame extraction failed: {0}")]
    FrameExtraction(String),

    #[error("Vision backend error: {0}")]
    Vision(String),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for Formcheck operations.
pub type Result<T> = std::result::Result<T, FormcheckError>;
