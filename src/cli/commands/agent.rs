//! Agent command implementation.

use crate::agent::Agent;
use crate::cli::preflight::{self, Operation};
use crate::cli::{truncate, Output};
use crate::config::Settings;
use crate::tools::{ToolExecutor, ToolRegistry};
use anyhow::Result;

/// Run the agent command.
pub async fn run_agent(
    task: &str,
    url: Option<String>,
    model: Option<String>,
    settings: &Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Agent) {
        Output::error(&format!("{}", e));
        Output::info("Run 'formcheck doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let model = model.unwrap_or_else(|| settings.agent.model.clone());
    let context = url.as_ref().map(|u| format!("Video URL: {}", u));

    let executor = ToolExecutor::new(ToolRegistry::standard(settings));
    let agent = Agent::new(executor, &model).with_max_iterations(settings.agent.max_iterations);

    let spinner = Output::spinner("Agent working...");

    match agent.run(task, context.as_deref()).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", response.content);

            if !response.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({})", response.tool_calls.len()));
                for call in &response.tool_calls {
                    let detail = match call.result.error() {
                        Some(error) => truncate(error, 80),
                        None => truncate(&call.arguments, 60),
                    };
                    Output::step(&call.name, call.result.is_success(), &detail);
                }
                println!();
            }

            Output::info(&format!("Completed in {} iteration(s)", response.iterations));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Agent failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
