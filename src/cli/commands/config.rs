//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
///
/// `config_path` is the `--config` override, when one was given.
pub fn run_config(
    action: &ConfigAction,
    config_path: Option<&str>,
    settings: &Settings,
) -> Result<()> {
    let config_path = config_path
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                Output::warning(&format!(
                    "Config already exists at {}",
                    config_path.display()
                ));
                Output::info("Use --force to overwrite it with defaults.");
                return Ok(());
            }

            Settings::default().save_to(&config_path)?;
            Output::success(&format!("Wrote default config to {}", config_path.display()));
        }
    }

    Ok(())
}
