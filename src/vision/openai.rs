//! OpenAI chat-completions vision backend.

use super::{CritiqueFrames, CritiqueReport, CritiqueRequest, TokenUsage};
use crate::config::{ImageDetailLevel, VisionSettings};
use crate::error::{FormcheckError, Result};
use crate::openai::create_client;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContentPart,
    CreateChatCompletionRequestArgs, ImageDetail, ImageUrlArgs,
};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

const SYSTEM_PROMPT: &str = "You are an experienced sports coach reviewing still frames from a video. \
Base every observation on what is visible in the frames: body position, balance, timing, \
equipment handling and follow-through. Be specific and practical.";

/// Vision backend backed by an OpenAI chat model.
pub struct OpenAIVision {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_tokens: u32,
    detail: ImageDetailLevel,
}

impl OpenAIVision {
    /// Create a backend with default settings for the given model.
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Self::from_settings(&VisionSettings::default())
        }
    }

    pub fn from_settings(settings: &VisionSettings) -> Self {
        Self {
            client: create_client(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            detail: settings.detail,
        }
    }

    fn build_messages(
        &self,
        request: &CritiqueRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> =
            Vec::with_capacity(request.frames.len() + 1);

        parts.push(
            ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(request.prompt_text())
                .build()
                .map_err(|e| FormcheckError::Vision(e.to_string()))?
                .into(),
        );

        for frame in &request.frames {
            let image_url = ImageUrlArgs::default()
                .url(image_url(frame))
                .detail(image_detail(self.detail))
                .build()
                .map_err(|e| FormcheckError::Vision(e.to_string()))?;

            parts.push(
                ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(image_url)
                    .build()
                    .map_err(|e| FormcheckError::Vision(e.to_string()))?
                    .into(),
            );
        }

        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| FormcheckError::Vision(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(parts)
                .build()
                .map_err(|e| FormcheckError::Vision(e.to_string()))?
                .into(),
        ])
    }
}

#[async_trait]
impl CritiqueFrames for OpenAIVision {
    #[instrument(skip(self, request), fields(model = %self.model, frames = request.frames.len()))]
    async fn critique(&self, request: &CritiqueRequest) -> Result<CritiqueReport> {
        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_tokens(self.max_tokens)
            .messages(self.build_messages(request)?)
            .build()
            .map_err(|e| FormcheckError::Vision(e.to_string()))?;

        debug!("Submitting {} frame(s) for critique", request.frames.len());

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(map_api_error)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        let usage = response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens));

        let report = report_from_parts(content, usage)?;
        info!(
            "Critique received ({} input / {} output tokens)",
            report.token_usage.input, report.token_usage.output
        );
        Ok(report)
    }
}

/// Frames arrive as raw base64; URLs and data URIs pass through untouched.
fn image_url(frame: &str) -> String {
    let frame = frame.trim();
    if frame.starts_with("data:") || frame.starts_with("https://") || frame.starts_with("http://") {
        frame.to_string()
    } else {
        format!("data:image/jpeg;base64,{}", frame)
    }
}

fn image_detail(level: ImageDetailLevel) -> ImageDetail {
    match level {
        ImageDetailLevel::Auto => ImageDetail::Auto,
        ImageDetailLevel::Low => ImageDetail::Low,
        ImageDetailLevel::High => ImageDetail::High,
    }
}

fn map_api_error(error: OpenAIError) -> FormcheckError {
    match error {
        OpenAIError::ApiError(api) => {
            FormcheckError::Vision(format!("request rejected: {}", api.message))
        }
        OpenAIError::Reqwest(e) => FormcheckError::Vision(format!("backend unavailable: {}", e)),
        OpenAIError::JSONDeserialize(e) => FormcheckError::MalformedResponse(e.to_string()),
        other => FormcheckError::OpenAI(other.to_string()),
    }
}

/// Assemble a report, rejecting responses without text or usage.
fn report_from_parts(
    content: Option<String>,
    usage: Option<(u32, u32)>,
) -> Result<CritiqueReport> {
    let analysis = content
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            FormcheckError::MalformedResponse("response contained no analysis text".into())
        })?;

    let (input, output) = usage.ok_or_else(|| {
        FormcheckError::MalformedResponse("response contained no usage counters".into())
    })?;

    Ok(CritiqueReport {
        analysis,
        token_usage: TokenUsage { input, output },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url() {
        assert_eq!(image_url("QUJD"), "data:image/jpeg;base64,QUJD");
        assert_eq!(image_url("data:image/png;base64,QUJD"), "data:image/png;base64,QUJD");
        assert_eq!(
            image_url("https://example.com/frame.jpg"),
            "https://example.com/frame.jpg"
        );
    }

    #[test]
    fn test_report_from_parts() {
        let report = report_from_parts(Some("  Good form\n".into()), Some((10, 5))).unwrap();
        assert_eq!(report.analysis, "Good form");
        assert_eq!(report.token_usage, TokenUsage { input: 10, output: 5 });
    }

    #[test]
    fn test_malformed_responses() {
        let err = report_from_parts(None, Some((1, 1))).unwrap_err();
        assert!(matches!(err, FormcheckError::MalformedResponse(_)));

        let err = report_from_parts(Some("   ".into()), Some((1, 1))).unwrap_err();
        assert!(err.to_string().contains("no analysis text"));

        let err = report_from_parts(Some("ok".into()), None).unwrap_err();
        assert!(err.to_string().contains("no usage counters"));
    }

    #[test]
    fn test_build_messages_has_one_image_per_frame() {
        let backend = OpenAIVision::new("gpt-4o");
        let request = CritiqueRequest {
            frames: vec!["QUJD".into(), "REVG".into()],
            instruction: "check the grip".into(),
            sport: "tennis".into(),
        };

        let messages = backend.build_messages(&request).unwrap();
        assert_eq!(messages.len(), 2);

        let user = serde_json::to_value(&messages[1]).unwrap();
        let content = user["content"].as_array().unwrap();
        assert_eq!(content.len(), 3);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,QUJD");
    }
}
