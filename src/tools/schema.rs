//! The tool contract table.
//!
//! One [`ToolSchema`] per tool, in calling-chain order. The table doubles as
//! documentation for the reasoning model, so descriptions spell out which
//! tool must run before which.

use super::tool::ToolName;
use crate::error::{FormcheckError, Result};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

/// JSON type of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Array(Box<ParamType>),
}

impl ParamType {
    /// JSON Schema fragment for this type.
    pub fn to_json_schema(&self) -> Value {
        match self {
            ParamType::String => json!({"type": "string"}),
            ParamType::Integer => json!({"type": "integer"}),
            ParamType::Number => json!({"type": "number"}),
            ParamType::Array(items) => json!({"type": "array", "items": items.to_json_schema()}),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.as_f64().is_some_and(|n| n.fract() == 0.0),
            ParamType::Number => value.is_number(),
            ParamType::Array(items) => value
                .as_array()
                .is_some_and(|values| values.iter().all(|v| items.matches(v))),
        }
    }

    fn describe(&self) -> String {
        match self {
            ParamType::String => "a string".into(),
            ParamType::Integer => "an integer".into(),
            ParamType::Number => "a number".into(),
            ParamType::Array(items) => {
                let item = items.describe();
                let noun = item.trim_start_matches("an ").trim_start_matches("a ");
                format!("an array of {}s", noun)
            }
        }
    }
}

/// One declared input parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: &'static str,
    pub required: bool,
}

impl ParamSpec {
    fn required(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            description,
            required: true,
        }
    }

    fn optional(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            description,
            required: false,
        }
    }
}

/// Name, purpose and input contract of one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSchema {
    pub name: ToolName,
    pub description: &'static str,
    /// Declared parameters in documentation order.
    pub params: Vec<ParamSpec>,
}

impl ToolSchema {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Names of the required parameters.
    pub fn required(&self) -> Vec<&'static str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect()
    }

    /// JSON Schema object describing the arguments.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| {
                let mut property = p.param_type.to_json_schema();
                property["description"] = Value::from(p.description);
                (p.name.to_string(), property)
            })
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required(),
        })
    }

    /// Check raw arguments against this schema.
    ///
    /// Every required parameter must be present and non-null, and every
    /// declared parameter that is present must have the declared type.
    /// Parameters the schema does not declare are returned so the caller can
    /// log them; they are not an error.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<Vec<String>> {
        for param in &self.params {
            match args.get(param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(FormcheckError::InvalidInput(format!(
                        "missing required parameter '{}' for {}",
                        param.name, self.name
                    )));
                }
                None | Some(Value::Null) => {}
                Some(value) if !param.param_type.matches(value) => {
                    return Err(FormcheckError::InvalidInput(format!(
                        "parameter '{}' for {} must be {}",
                        param.name,
                        self.name,
                        param.param_type.describe()
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(args
            .keys()
            .filter(|key| self.param(key).is_none())
            .cloned()
            .collect())
    }
}

impl Serialize for ToolSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        json!({
            "name": self.name.as_str(),
            "description": self.description,
            "input_schema": self.input_schema(),
        })
        .serialize(serializer)
    }
}

/// The full contract table, in calling-chain order.
pub fn tool_schemas() -> &'static [ToolSchema] {
    static SCHEMAS: OnceLock<Vec<ToolSchema>> = OnceLock::new();
    SCHEMAS.get_or_init(|| ToolName::ALL.into_iter().map(build_schema).collect())
}

/// Schema for one tool.
pub fn schema_for(name: ToolName) -> &'static ToolSchema {
    &tool_schemas()[name.index()]
}

fn build_schema(name: ToolName) -> ToolSchema {
    match name {
        ToolName::DownloadYoutubeVideo => ToolSchema {
            name,
            description: "Downloads a video from YouTube (or another http(s) video page) and saves it to a local file. \
                Use this tool when you need to get a video file from a URL. \
                This must be called BEFORE extract_video_frames.",
            params: vec![
                ParamSpec::required(
                    "url",
                    ParamType::String,
                    "The full video URL (e.g., https://www.youtube.com/watch?v=VIDEO_ID)",
                ),
                ParamSpec::optional(
                    "output_dir",
                    ParamType::String,
                    "Directory to save the downloaded video (optional, defaults to the scratch directory)",
                ),
            ],
        },
        ToolName::ExtractVideoFrames => ToolSchema {
            name,
            description: "Extracts frames from a video file. \
                Frames are evenly-spaced samples inside the video duration unless explicit positions are given. \
                Use this tool AFTER download_youtube_video and BEFORE analyze_sport_technique. \
                Returns base64-encoded JPEG images in frames_data, ready for analyze_sport_technique.",
            params: vec![
                ParamSpec::required(
                    "video_path",
                    ParamType::String,
                    "Full path to the video file (returned from download_youtube_video)",
                ),
                ParamSpec::optional(
                    "num_frames",
                    ParamType::Integer,
                    "Number of frames to extract (default: 5, recommended: 3-10 for cost efficiency)",
                ),
                ParamSpec::optional(
                    "positions",
                    ParamType::Array(Box::new(ParamType::Number)),
                    "Optional: specific positions to extract frames at (0.0-1.0, where 0.0=start, 1.0=end); overrides num_frames",
                ),
            ],
        },
        ToolName::AnalyzeSportTechnique => ToolSchema {
            name,
            description: "Analyzes sports technique from video frames using a vision-capable model. \
                Takes multiple frames and provides detailed observations about technique, form, positioning, etc. \
                Use this tool AFTER extract_video_frames. This is the final step in the analysis chain.",
            params: vec![
                ParamSpec::required(
                    "frames_data",
                    ParamType::Array(Box::new(ParamType::String)),
                    "Array of base64-encoded frame images (from extract_video_frames)",
                ),
                ParamSpec::required(
                    "analysis_prompt",
                    ParamType::String,
                    "Specific analysis request (e.g., 'analyze table tennis technique and list 5 observations')",
                ),
                ParamSpec::optional(
                    "sport_type",
                    ParamType::String,
                    "Type of sport being analyzed (optional, helps context)",
                ),
            ],
        },
    }
}
