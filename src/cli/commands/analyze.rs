//! Analyze command - run the full chain on one video.

use crate::cli::preflight::{self, Operation};
use crate::cli::{format_size, Output};
use crate::config::Settings;
use crate::orchestrator::{ChainRequest, ChainStep, Orchestrator};
use crate::tools::ToolName;
use anyhow::Result;
use console::style;
use std::path::PathBuf;

/// Run the analyze command.
pub async fn run_analyze(
    url: &str,
    prompt: &str,
    sport: Option<String>,
    frames: Option<u32>,
    output_dir: Option<PathBuf>,
    settings: &Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Analyze) {
        Output::error(&format!("{}", e));
        Output::info("Run 'formcheck doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings);

    let mut request = ChainRequest::new(url, prompt);
    request.sport_type = sport;
    request.num_frames = frames;
    request.output_dir = output_dir.map(|dir| dir.to_string_lossy().to_string());

    let spinner = Output::spinner("Downloading, sampling and analyzing...");
    let report = orchestrator.run_chain(&request).await;
    spinner.finish_and_clear();

    Output::header("Steps");
    for step in &report.steps {
        Output::step(step.tool.as_str(), step.result.is_success(), &step_detail(step));
    }

    if let Some(failed) = report.failed_step() {
        let message = failed.result.error().unwrap_or("unknown error");
        Output::error(&format!("{} failed: {}", failed.tool, message));
        anyhow::bail!("analysis chain stopped at {}", failed.tool);
    }

    if let Some(analysis) = report.analysis() {
        Output::header("Analysis");
        println!("\n{}\n", analysis);
    }

    if let Some(usage) = report
        .final_result()
        .and_then(|result| result.get("token_usage"))
    {
        let input = usage.get("input").and_then(|v| v.as_u64()).unwrap_or(0);
        let output = usage.get("output").and_then(|v| v.as_u64()).unwrap_or(0);
        Output::info(&format!(
            "Tokens used: {} in, {} out",
            style(input).bold(),
            style(output).bold()
        ));
    }

    Ok(())
}

/// One-line summary of a step's result.
fn step_detail(step: &ChainStep) -> String {
    let result = &step.result;
    if let Some(error) = result.error() {
        return error.to_string();
    }

    match step.tool {
        ToolName::DownloadYoutubeVideo => {
            let path = result
                .get("video_path")
                .and_then(|v| v.as_str())
                .unwrap_or("?");
            match result.get("size_bytes").and_then(|v| v.as_u64()) {
                Some(size) => format!("{} ({})", path, format_size(size)),
                None => path.to_string(),
            }
        }
        ToolName::ExtractVideoFrames => {
            let count = result
                .get("frame_count")
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            format!("{} frame(s)", count)
        }
        ToolName::AnalyzeSportTechnique => "critique received".to_string(),
    }
}
