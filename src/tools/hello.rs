//! `SayHello` - greet someone by name.

use async_trait::async_trait;
use tracing::debug;

use super::{NamedTool, Tool, ToolDefinition};
use crate::context::ToolContext;
use crate::error::ToolError;

#[derive(Debug, Clone, Copy, Default)]
pub struct SayHello;

impl SayHello {
    pub fn greet(name: &str) -> String {
        format!("Hello, {}!", name)
    }
}

impl NamedTool for SayHello {
    const NAME: &'static str = "SayHello";
}

#[async_trait]
impl Tool for SayHello {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Say a greeting!".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "The name of the person to greet"
                    }
                },
                "required": ["name"],
                "additionalProperties": false
            }),
        }
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        debug!(tool_call_id = ?context.tool_call_id(), "Executing SayHello");

        let name = args
            .get("name")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ToolError::execution(Self::NAME, "'name' must be a string"))?;

        Ok(serde_json::Value::String(Self::greet(name)))
    }
}
