//! Call command - execute one tool through the executor.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::{ToolExecutor, ToolName, ToolRegistry};
use anyhow::Result;

/// Run a single tool call and print the JSON result on stdout.
///
/// Tool-level failures are printed as results, not returned as errors.
pub async fn run_call(tool: &str, input: Option<&str>, settings: &Settings) -> Result<()> {
    if let Some(operation) = tool.parse::<ToolName>().ok().map(required_by) {
        if let Err(e) = preflight::check(operation) {
            Output::warning(&format!("{}", e));
        }
    }

    let executor = ToolExecutor::new(ToolRegistry::standard(settings));
    let result = executor.execute_json(tool, input.unwrap_or("")).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if let Some(error) = result.error() {
        Output::error(error);
    }

    Ok(())
}

fn required_by(tool: ToolName) -> Operation {
    match tool {
        ToolName::DownloadYoutubeVideo => Operation::Download,
        ToolName::ExtractVideoFrames => Operation::Extract,
        ToolName::AnalyzeSportTechnique => Operation::Critique,
    }
}
