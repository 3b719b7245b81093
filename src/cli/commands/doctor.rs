//! Doctor command - report whether every tool in the chain can run.

use crate::cli::preflight::{self, install_hint, program_status, ProgramStatus, PROGRAMS};
use crate::cli::{truncate, Output};
use crate::config::Settings;
use anyhow::Result;
use console::style;

/// Severity of one finding; ordered so the worst level sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Pass,
    Warn,
    Fail,
}

/// One line of the report.
#[derive(Debug)]
struct Finding {
    level: Level,
    subject: String,
    detail: String,
    fix: Option<String>,
}

impl Finding {
    fn new(level: Level, subject: &str, detail: impl Into<String>) -> Self {
        Self {
            level,
            subject: subject.to_string(),
            detail: detail.into(),
            fix: None,
        }
    }

    fn fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    fn print(&self) {
        let mark = match self.level {
            Level::Pass => style("ok  ").green(),
            Level::Warn => style("warn").yellow(),
            Level::Fail => style("FAIL").red(),
        };
        println!("  [{}] {} {}", mark, style(&self.subject).bold(), self.detail);
        if let Some(fix) = &self.fix {
            println!("         {}", style(fix).dim());
        }
    }
}

/// Run all diagnostic checks; fails when any check fails.
pub fn run_doctor(settings: &Settings) -> Result<()> {
    Output::header("Formcheck Doctor");

    let sections = [
        ("External programs", program_findings()),
        ("Credentials", vec![api_key_finding()]),
        ("Storage", vec![scratch_dir_finding(settings)]),
        ("Configuration", vec![config_finding(settings)]),
    ];

    for (title, findings) in &sections {
        println!("\n{}", style(title).bold());
        for finding in findings {
            finding.print();
        }
    }
    println!();

    let findings = sections.iter().flat_map(|(_, findings)| findings);
    let failures = findings.clone().filter(|f| f.level == Level::Fail).count();
    let warnings = findings.filter(|f| f.level == Level::Warn).count();

    if failures > 0 {
        Output::error(&format!("{} check(s) failed", failures));
        anyhow::bail!("doctor found {} problem(s)", failures);
    }
    if warnings > 0 {
        Output::warning(&format!("Ready, with {} warning(s)", warnings));
    } else {
        Output::success("Ready: download, extract and analyze can all run");
    }
    Ok(())
}

fn program_findings() -> Vec<Finding> {
    PROGRAMS
        .iter()
        .map(|&name| match program_status(name) {
            ProgramStatus::Available(version) => {
                Finding::new(Level::Pass, name, truncate(&version, 50))
            }
            ProgramStatus::Missing => {
                Finding::new(Level::Fail, name, "not found on PATH").fix(install_hint(name))
            }
            ProgramStatus::Broken(reason) => {
                Finding::new(Level::Fail, name, format!("present but {}", reason))
                    .fix(install_hint(name))
            }
        })
        .collect()
}

fn api_key_finding() -> Finding {
    match preflight::check_api_key() {
        Ok(()) => Finding::new(Level::Pass, "OPENAI_API_KEY", "set"),
        Err(e) => Finding::new(Level::Fail, "OPENAI_API_KEY", e.to_string())
            .fix("needed by analyze_sport_technique and the agent"),
    }
}

/// Downloads land here unless a call names its own directory.
fn scratch_dir_finding(settings: &Settings) -> Finding {
    let scratch = settings.scratch_dir();
    let shown = scratch.display().to_string();

    if !scratch.exists() {
        return Finding::new(Level::Warn, "scratch_dir", format!("{} (will be created)", shown));
    }

    match tempfile::tempfile_in(&scratch) {
        Ok(_) => Finding::new(Level::Pass, "scratch_dir", shown),
        Err(e) => {
            let detail = format!("{} is not writable: {}", shown, e);
            Finding::new(Level::Fail, "scratch_dir", detail)
                .fix("set general.scratch_dir to a writable directory")
        }
    }
}

fn config_finding(settings: &Settings) -> Finding {
    let models = format!(
        "vision model {}, agent model {}",
        settings.vision.model, settings.agent.model
    );
    let path = Settings::default_config_path();

    if path.exists() {
        Finding::new(Level::Pass, "config", format!("{} ({})", path.display(), models))
    } else {
        Finding::new(Level::Warn, "config", format!("using defaults ({})", models))
            .fix("create one with: formcheck config init")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_order_by_severity() {
        assert!(Level::Pass < Level::Warn && Level::Warn < Level::Fail);
    }

    #[test]
    fn test_one_finding_per_program() {
        let findings = program_findings();
        let subjects: Vec<&str> = findings.iter().map(|f| f.subject.as_str()).collect();
        assert_eq!(subjects, PROGRAMS);
        assert!(findings.iter().all(|f| f.level == Level::Pass || f.fix.is_some()));
    }

    #[test]
    fn test_config_finding_names_models() {
        let finding = config_finding(&Settings::default());
        assert!(finding.detail.contains("vision model gpt-4o"));
    }

    #[test]
    fn test_scratch_dir_finding() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();

        settings.general.scratch_dir = dir.path().to_string_lossy().to_string();
        assert_eq!(scratch_dir_finding(&settings).level, Level::Pass);

        settings.general.scratch_dir = dir.path().join("later").to_string_lossy().to_string();
        assert_eq!(scratch_dir_finding(&settings).level, Level::Warn);
    }
}
