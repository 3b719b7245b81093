//! The single dispatch point for tool calls.

use super::registry::ToolRegistry;
use super::result::ToolResult;
use super::schema::ToolSchema;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, info, instrument, warn};

/// Turns `(tool name, raw arguments)` into a [`ToolResult`].
///
/// Nothing escapes `execute`: unknown tools, invalid arguments, tool errors
/// and panics all come back as `ToolResult::Failure`.
pub struct ToolExecutor {
    registry: ToolRegistry,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Contract table for the registered tools, in calling-chain order.
    pub fn schemas(&self) -> Vec<&'static ToolSchema> {
        self.registry.schemas()
    }

    /// Execute a tool whose arguments arrive as a JSON string.
    pub async fn execute_json(&self, name: &str, arguments: &str) -> ToolResult {
        let arguments = arguments.trim();
        if arguments.is_empty() {
            return self.execute(name, Value::Null).await;
        }
        match serde_json::from_str::<Value>(arguments) {
            Ok(value) => self.execute(name, value).await,
            Err(e) => ToolResult::failure(format!(
                "Invalid input: arguments are not valid JSON: {}",
                e
            )),
        }
    }

    /// Execute a tool by name.
    #[instrument(skip(self, input), fields(tool = %name))]
    pub async fn execute(&self, name: &str, input: Value) -> ToolResult {
        let Some(tool) = self.registry.get(name) else {
            warn!("Unknown tool requested");
            return ToolResult::failure(format!("Unknown tool: {}", name));
        };

        let args = match input {
            Value::Object(args) => args,
            Value::Null => Map::new(),
            other => {
                return ToolResult::failure(format!(
                    "Invalid input: arguments for {} must be a JSON object, got {}",
                    name,
                    json_kind(&other)
                ));
            }
        };

        match tool.schema().validate(&args) {
            Ok(unknown) if !unknown.is_empty() => {
                debug!("Ignoring undeclared parameters: {}", unknown.join(", "));
            }
            Ok(_) => {}
            Err(e) => {
                info!("Rejected arguments: {}", e);
                return ToolResult::from_error(&e);
            }
        }

        let outcome = AssertUnwindSafe(tool.call(args)).catch_unwind().await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!("Tool returned an error: {}", e);
                ToolResult::failure(format!("Tool execution failed: {}", e))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!("Tool panicked: {}", message);
                ToolResult::failure(format!("Tool execution failed: {}", message))
            }
        };

        if result.is_success() {
            info!("Tool succeeded");
        } else {
            info!("Tool failed: {}", result.error().unwrap_or_default());
        }
        result
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}
