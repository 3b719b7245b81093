//! Agent runner with tool calling loop.

use super::tools::tool_definitions;
use crate::error::{FormcheckError, Result};
use crate::openai::create_client;
use crate::tools::{ToolExecutor, ToolResult};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use tracing::{debug, info};

/// Default system prompt for the agent.
const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a sports technique analyst with tools for working with videos.

The tools form a chain and must be called in this order:
1. 'download_youtube_video' with the video URL. It returns 'video_path'.
2. 'extract_video_frames' with that 'video_path'. It returns 'frames_data'.
3. 'analyze_sport_technique' with that 'frames_data' and an 'analysis_prompt'.

Every tool returns JSON with a boolean 'success'. When 'success' is false, read 'error'
and decide whether to retry with different arguments or explain the problem to the user.

Once the analysis is available, present it clearly with concrete, actionable coaching points."#;

/// Agent that drives the tool chain with an OpenAI model.
pub struct Agent {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    executor: ToolExecutor,
    max_iterations: usize,
    system_prompt: String,
}

impl Agent {
    /// Create a new agent over the given executor and model.
    pub fn new(executor: ToolExecutor, model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            executor,
            max_iterations: 10,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run the agent with a user task.
    pub async fn run(&self, task: &str, context: Option<&str>) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| FormcheckError::Agent(e.to_string()))?
                .into(),
        ];

        let user_message = match context {
            Some(ctx) => format!("Context: {}\n\nTask: {}", ctx, task),
            None => task.to_string(),
        };

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(|e| FormcheckError::Agent(e.to_string()))?
                .into(),
        );

        let tools = tool_definitions(&self.executor.schemas());
        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(FormcheckError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(messages.clone())
                .tools(tools.clone())
                .build()
                .map_err(|e| FormcheckError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| FormcheckError::OpenAI(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| FormcheckError::Agent("No response from model".to_string()))?;

            let tool_calls = match &choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    return Ok(build_response(
                        &choice.message.content,
                        tool_calls_made,
                        iterations,
                    ))
                }
            };

            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| FormcheckError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            // Calls run one at a time; each result is appended before the next call.
            for tool_call in tool_calls {
                let record = self.execute_tool_call(tool_call).await;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.to_string())
                    .build()
                    .map_err(|e| FormcheckError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} ({} bytes of arguments)", name, arguments.len());

        let result = self.executor.execute_json(name, arguments).await;

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

/// Build the final agent response.
fn build_response(
    content: &Option<String>,
    tool_calls: Vec<ToolCallRecord>,
    iterations: usize,
) -> AgentResponse {
    AgentResponse {
        content: content.clone().unwrap_or_default(),
        tool_calls,
        iterations,
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the executor.
    pub result: ToolResult,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.result.is_success() { "ok" } else { "failed" };
        write!(f, "{} [{}]", self.name, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "extract_video_frames".to_string(),
            arguments: r#"{"video_path": "/tmp/a.mp4"}"#.to_string(),
            result: ToolResult::failure("Cannot read video file: /tmp/a.mp4"),
        };
        assert_eq!(format!("{}", record), "extract_video_frames [failed]");
    }

    #[test]
    fn test_build_response_defaults_empty_content() {
        let response = build_response(&None, Vec::new(), 2);
        assert_eq!(response.content, "");
        assert_eq!(response.iterations, 2);
    }

    #[test]
    fn test_builder_options() {
        let agent = Agent::new(ToolExecutor::new(ToolRegistry::new()), "gpt-4o")
            .with_max_iterations(3)
            .with_system_prompt("be brief");
        assert_eq!(agent.max_iterations, 3);
        assert_eq!(agent.system_prompt, "be brief");
        assert_eq!(agent.model, "gpt-4o");
    }

    #[tokio::test]
    async fn test_iteration_bound_stops_before_calling_model() {
        let agent = Agent::new(ToolExecutor::new(ToolRegistry::new()), "gpt-4o")
            .with_max_iterations(0);

        let err = agent.run("critique my serve", None).await.unwrap_err();
        assert!(matches!(
            err,
            FormcheckError::Agent(msg) if msg == "Agent exceeded maximum iterations (0)"
        ));
    }

    #[test]
    fn test_system_prompt_names_every_tool_in_order() {
        let download = DEFAULT_SYSTEM_PROMPT.find("download_youtube_video").unwrap();
        let extract = DEFAULT_SYSTEM_PROMPT.find("extract_video_frames").unwrap();
        let analyze = DEFAULT_SYSTEM_PROMPT.find("analyze_sport_technique").unwrap();
        assert!(download < extract && extract < analyze);
    }
}
