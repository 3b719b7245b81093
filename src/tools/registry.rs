//! Tool registry: name to implementation binding.

use super::analyze::AnalyzeTechniqueTool;
use super::download::DownloadVideoTool;
use super::frames::ExtractFramesTool;
use super::schema::ToolSchema;
use super::tool::{Tool, ToolName};
use crate::config::Settings;
use crate::media::{FetchMedia, FfmpegSampler, SampleFrames, YtDlpFetcher};
use crate::vision::{CritiqueFrames, OpenAIVision};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of tool implementations keyed by tool name.
pub struct ToolRegistry {
    tools: HashMap<ToolName, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry with the three standard tools and the real backends.
    pub fn standard(settings: &Settings) -> Self {
        Self::with_backends(
            Arc::new(YtDlpFetcher::new(&settings.download.format)),
            Arc::new(FfmpegSampler::from_settings(&settings.frames)),
            Arc::new(OpenAIVision::from_settings(&settings.vision)),
            settings,
        )
    }

    /// Registry with the three standard tools over caller-supplied backends.
    pub fn with_backends(
        fetcher: Arc<dyn FetchMedia>,
        sampler: Arc<dyn SampleFrames>,
        critic: Arc<dyn CritiqueFrames>,
        settings: &Settings,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(DownloadVideoTool::new(fetcher, settings.scratch_dir()));
        registry.register(ExtractFramesTool::new(sampler, settings.frames.default_count));
        registry.register(AnalyzeTechniqueTool::new(
            critic,
            &settings.vision.default_sport,
        ));
        registry
    }

    /// Registers a tool, replacing any tool with the same name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name(), Arc::new(tool));
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Gets a tool by its wire name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let name = name.parse::<ToolName>().ok()?;
        self.tools.get(&name).cloned()
    }

    /// Returns `true` if a tool with the given wire name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered tool names in calling-chain order.
    pub fn names(&self) -> Vec<ToolName> {
        ToolName::ALL
            .into_iter()
            .filter(|name| self.tools.contains_key(name))
            .collect()
    }

    /// Schemas of the registered tools in calling-chain order.
    pub fn schemas(&self) -> Vec<&'static ToolSchema> {
        self.names()
            .into_iter()
            .filter_map(|name| self.tools.get(&name).map(|tool| tool.schema()))
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
