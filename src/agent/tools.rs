//! Conversion of the tool contract table into OpenAI function tools.

use crate::tools::ToolSchema;
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

/// OpenAI tool declaration for one schema.
pub fn tool_definition(schema: &ToolSchema) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: schema.name.as_str().to_string(),
            description: Some(schema.description.to_string()),
            parameters: Some(schema.input_schema()),
            strict: None,
        },
    }
}

/// OpenAI tool declarations, in calling-chain order.
pub fn tool_definitions(schemas: &[&ToolSchema]) -> Vec<ChatCompletionTool> {
    schemas.iter().map(|schema| tool_definition(schema)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tool_schemas;

    #[test]
    fn test_definitions_mirror_schemas() {
        let schemas: Vec<&ToolSchema> = tool_schemas().iter().collect();
        let definitions = tool_definitions(&schemas);

        assert_eq!(definitions.len(), 3);
        for (definition, schema) in definitions.iter().zip(&schemas) {
            assert_eq!(definition.function.name, schema.name.as_str());
            assert_eq!(
                definition.function.parameters.as_ref(),
                Some(&schema.input_schema())
            );
        }
        assert!(definitions[0]
            .function
            .description
            .as_deref()
            .unwrap()
            .contains("BEFORE extract_video_frames"));
    }
}
