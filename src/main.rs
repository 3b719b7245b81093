//! Formcheck CLI entry point.

use anyhow::Result;
use clap::Parser;
use formcheck::cli::{commands, Cli, Commands};
use formcheck::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging; stdout is reserved for command output
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("formcheck={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match &cli.command {
        Commands::Schemas => {
            commands::run_schemas()?;
        }

        Commands::Call { tool, input } => {
            commands::run_call(tool, input.as_deref(), &settings).await?;
        }

        Commands::Analyze {
            url,
            prompt,
            sport,
            frames,
            output_dir,
        } => {
            commands::run_analyze(
                url,
                prompt,
                sport.clone(),
                *frames,
                output_dir.clone(),
                &settings,
            )
            .await?;
        }

        Commands::Agent { task, url, model } => {
            commands::run_agent(task, url.clone(), model.clone(), &settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, cli.config.as_deref(), &settings)?;
        }
    }

    Ok(())
}
