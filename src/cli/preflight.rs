//! Pre-flight checks before expensive operations.
//!
//! Validates that required programs and credentials are available
//! before starting a chain that would otherwise fail midway.

use crate::error::{FormcheckError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Downloading needs yt-dlp (and ffmpeg to merge streams).
    Download,
    /// Frame extraction needs ffmpeg and ffprobe.
    Extract,
    /// Critiquing frames needs only an API key.
    Critique,
    /// The full chain needs every program and an API key.
    Analyze,
    /// The agent needs an API key; programs are checked per tool call.
    Agent,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Download => {
            check_tool("yt-dlp")?;
            check_tool("ffmpeg")?;
        }
        Operation::Extract => {
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
        Operation::Analyze => {
            check_api_key()?;
            check_tool("yt-dlp")?;
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
        Operation::Critique | Operation::Agent => {
            check_api_key()?;
        }
    }
    Ok(())
}

/// External programs the media backends shell out to.
pub const PROGRAMS: [&str; 3] = ["yt-dlp", "ffmpeg", "ffprobe"];

/// Availability of one external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramStatus {
    /// Runs; holds the first line of its version output.
    Available(String),
    /// Not on `PATH`.
    Missing,
    /// Found but the version query failed.
    Broken(String),
}

/// Run `name`'s version query and classify the outcome.
pub fn program_status(name: &str) -> ProgramStatus {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout.lines().next().unwrap_or("").trim();
            ProgramStatus::Available(version.to_string())
        }
        Ok(output) => ProgramStatus::Broken(format!("exited with {}", output.status)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProgramStatus::Missing,
        Err(e) => ProgramStatus::Broken(e.to_string()),
    }
}

/// How to install one of [`PROGRAMS`] on this platform.
pub fn install_hint(name: &str) -> String {
    let package = if name == "ffprobe" { "ffmpeg" } else { name };
    if cfg!(target_os = "macos") {
        format!("brew install {}", package)
    } else if name == "yt-dlp" {
        "pipx install yt-dlp".to_string()
    } else {
        format!("install the '{}' package with your package manager", package)
    }
}

/// Check that an OpenAI API key is configured.
pub fn check_api_key() -> Result<()> {
    api_key_status(std::env::var("OPENAI_API_KEY").ok().as_deref())
}

fn api_key_status(key: Option<&str>) -> Result<()> {
    match key {
        Some(key) if !key.trim().is_empty() => Ok(()),
        Some(_) => Err(FormcheckError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        None => Err(FormcheckError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

fn check_tool(name: &str) -> Result<()> {
    match program_status(name) {
        ProgramStatus::Available(_) => Ok(()),
        ProgramStatus::Missing => Err(FormcheckError::ToolNotFound(name.to_string())),
        ProgramStatus::Broken(reason) => Err(FormcheckError::ToolNotFound(format!(
            "{} is installed but not working correctly ({})",
            name, reason
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_status() {
        assert!(api_key_status(Some("sk-test")).is_ok());
        assert!(matches!(
            api_key_status(Some("")),
            Err(FormcheckError::Config(msg)) if msg.contains("empty")
        ));
        assert!(matches!(
            api_key_status(None),
            Err(FormcheckError::Config(msg)) if msg.contains("not set")
        ));
    }

    #[test]
    fn test_missing_program_status() {
        assert_eq!(program_status("formcheck-no-such-program"), ProgramStatus::Missing);
    }

    #[test]
    fn test_install_hint_maps_ffprobe_to_ffmpeg() {
        assert!(install_hint("ffprobe").contains("ffmpeg"));
        assert!(install_hint("yt-dlp").contains("yt-dlp"));
    }

    #[test]
    fn test_missing_program_is_tool_not_found() {
        let err = check_tool("formcheck-no-such-program").unwrap_err();
        assert!(
            matches!(err, FormcheckError::ToolNotFound(name) if name == "formcheck-no-such-program")
        );
    }
}
