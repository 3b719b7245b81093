//! Deterministic pipeline over the tool chain.
//!
//! Runs download -> extract -> analyze through the [`ToolExecutor`], handing
//! each step's success fields to the next step unchanged. Useful when the
//! calling order is known up front and no reasoning model is needed to pick
//! the next tool.

use crate::config::Settings;
use crate::tools::{ToolExecutor, ToolName, ToolRegistry, ToolResult};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

/// Inputs for one full chain run.
#[derive(Debug, Clone)]
pub struct ChainRequest {
    pub url: String,
    pub analysis_prompt: String,
    pub sport_type: Option<String>,
    pub num_frames: Option<u32>,
    pub positions: Option<Vec<f64>>,
    pub output_dir: Option<String>,
}

impl ChainRequest {
    pub fn new(url: &str, analysis_prompt: &str) -> Self {
        Self {
            url: url.to_string(),
            analysis_prompt: analysis_prompt.to_string(),
            sport_type: None,
            num_frames: None,
            positions: None,
            output_dir: None,
        }
    }
}

/// One executed step.
#[derive(Debug, Clone, Serialize)]
pub struct ChainStep {
    pub tool: ToolName,
    pub result: ToolResult,
}

/// Every step that ran, in order. Stops after the first failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChainReport {
    pub steps: Vec<ChainStep>,
}

impl ChainReport {
    /// True when all three steps ran and succeeded.
    pub fn succeeded(&self) -> bool {
        self.steps.len() == ToolName::ALL.len() && self.steps.iter().all(|s| s.result.is_success())
    }

    /// The step that failed, if any.
    pub fn failed_step(&self) -> Option<&ChainStep> {
        self.steps.iter().find(|s| !s.result.is_success())
    }

    /// Result of the final step, when it ran.
    pub fn final_result(&self) -> Option<&ToolResult> {
        self.steps
            .last()
            .filter(|s| s.tool == ToolName::AnalyzeSportTechnique)
            .map(|s| &s.result)
    }

    pub fn analysis(&self) -> Option<&str> {
        self.final_result()?.get("analysis")?.as_str()
    }

    pub fn step(&self, tool: ToolName) -> Option<&ToolResult> {
        self.steps.iter().find(|s| s.tool == tool).map(|s| &s.result)
    }
}

/// Runs the tool chain end to end.
pub struct Orchestrator {
    executor: ToolExecutor,
}

impl Orchestrator {
    /// Create an orchestrator over the standard tools and real backends.
    pub fn new(settings: &Settings) -> Self {
        Self::with_executor(ToolExecutor::new(ToolRegistry::standard(settings)))
    }

    pub fn with_executor(executor: ToolExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    /// Run download, extract and analyze in order.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn run_chain(&self, request: &ChainRequest) -> ChainReport {
        let mut report = ChainReport::default();

        let mut args = Map::new();
        args.insert("url".into(), Value::from(request.url.clone()));
        insert_opt(&mut args, "output_dir", request.output_dir.clone());

        for tool in ToolName::ALL {
            let result = self.executor.execute(tool.as_str(), Value::Object(args)).await;
            let next = result.fields().cloned();
            report.steps.push(ChainStep { tool, result });

            let Some(fields) = next else {
                warn!("Chain stopped at {}", tool);
                return report;
            };

            args = fields;
            match tool {
                ToolName::DownloadYoutubeVideo => {
                    insert_opt(&mut args, "num_frames", request.num_frames);
                    insert_opt(&mut args, "positions", request.positions.clone());
                }
                ToolName::ExtractVideoFrames => {
                    args.insert(
                        "analysis_prompt".into(),
                        Value::from(request.analysis_prompt.clone()),
                    );
                    insert_opt(&mut args, "sport_type", request.sport_type.clone());
                }
                ToolName::AnalyzeSportTechnique => {}
            }
        }

        info!("Chain completed");
        report
    }
}

fn insert_opt<T: Into<Value>>(args: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        args.insert(key.to_string(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubCritic, StubFetcher, StubSampler};
    use serde_json::json;
    use std::sync::Arc;

    fn orchestrator(
        dir: &std::path::Path,
        fetcher: StubFetcher,
        sampler: Arc<StubSampler>,
        critic: Arc<StubCritic>,
    ) -> Orchestrator {
        let mut settings = Settings::default();
        settings.general.scratch_dir = dir.to_string_lossy().to_string();
        Orchestrator::with_executor(ToolExecutor::new(ToolRegistry::with_backends(
            Arc::new(fetcher),
            sampler,
            critic,
            &settings,
        )))
    }

    #[tokio::test]
    async fn test_full_chain() {
        let dir = tempfile::tempdir().unwrap();
        let sampler = Arc::new(StubSampler::with_duration(60.0));
        let critic = Arc::new(StubCritic::replying("Keep your elbow higher", 120, 40));
        let orchestrator = orchestrator(
            dir.path(),
            StubFetcher::writing(b"video"),
            sampler.clone(),
            critic.clone(),
        );

        let mut request = ChainRequest::new("https://example.com/clip", "list 3 observations");
        request.num_frames = Some(3);
        request.sport_type = Some("tennis".into());

        let report = orchestrator.run_chain(&request).await;

        assert!(report.succeeded(), "{:?}", report);
        assert!(report.failed_step().is_none());
        assert_eq!(report.analysis(), Some("Keep your elbow higher"));
        assert_eq!(
            report.final_result().unwrap().get("token_usage"),
            Some(&json!({"input": 120, "output": 40}))
        );
        assert_eq!(sampler.sampled_at().len(), 3);

        let sent = critic.last_request().unwrap();
        assert_eq!(sent.sport, "tennis");
        assert_eq!(sent.frames, vec!["frame@12.0", "frame@30.0", "frame@48.0"]);
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let sampler = Arc::new(StubSampler::with_duration(60.0));
        let critic = Arc::new(StubCritic::replying("ok", 1, 1));
        let orchestrator = orchestrator(
            dir.path(),
            StubFetcher::failing("HTTP Error 404"),
            sampler.clone(),
            critic.clone(),
        );

        let report = orchestrator
            .run_chain(&ChainRequest::new("https://example.com/gone", "go"))
            .await;

        assert!(!report.succeeded());
        assert_eq!(report.steps.len(), 1);
        let failed = report.failed_step().unwrap();
        assert_eq!(failed.tool, ToolName::DownloadYoutubeVideo);
        assert!(failed.result.error().unwrap().contains("HTTP Error 404"));
        assert!(report.analysis().is_none());
        assert_eq!(sampler.calls() + critic.calls(), 0);
    }

    #[tokio::test]
    async fn test_explicit_positions_flow_through() {
        let dir = tempfile::tempdir().unwrap();
        let sampler = Arc::new(StubSampler::with_duration(10.0));
        let critic = Arc::new(StubCritic::replying("ok", 1, 1));
        let orchestrator = orchestrator(
            dir.path(),
            StubFetcher::writing(b"video"),
            sampler,
            critic.clone(),
        );

        let mut request = ChainRequest::new("https://example.com/clip", "serve toss");
        request.positions = Some(vec![0.9, 0.1]);

        let report = orchestrator.run_chain(&request).await;
        assert!(report.succeeded());
        assert_eq!(
            report.step(ToolName::ExtractVideoFrames).unwrap().get("positions"),
            Some(&json!([0.1, 0.9]))
        );
        assert_eq!(critic.last_request().unwrap().frames, vec!["frame@1.0", "frame@9.0"]);
    }
}
