use async_trait::async_trait;
use geoagent_llm::chat::{FunctionTool, Tool};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

mod provider;
pub use provider::{ToolSet, ToolSetError, ToolSetProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub tool_name: String,
    pub success: bool,
    pub arguments: Value,
    pub result: Value,
}

impl ToolCallResult {
    /// Text handed back to the model for this call.
    pub fn content(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolCallError {
    #[error("Runtime Error {0}")]
    RuntimeError(#[from] Box<dyn std::error::Error + Sync + Send>),

    #[error("Serde Error {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// A callable capability the model can ask for by name.
#[async_trait]
pub trait ToolT: Send + Sync + Debug {
    /// The name of the tool.
    fn name(&self) -> &str;
    /// A description explaining the tool's purpose.
    fn description(&self) -> &str;
    /// JSON schema of the expected arguments.
    fn args_schema(&self) -> Value;
    /// Run the tool with the given arguments (in JSON) and return the result (in JSON).
    async fn run(&self, args: Value) -> Result<Value, ToolCallError>;
}

impl From<&dyn ToolT> for Tool {
    fn from(tool: &dyn ToolT) -> Self {
        Tool {
            tool_type: "function".to_string(),
            function: FunctionTool {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.args_schema(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Serialize, Deserialize)]
    struct BufferInput {
        geometry: String,
        distance: f64,
    }

    #[derive(Debug)]
    struct BufferTool {
        should_fail: bool,
    }

    #[async_trait]
    impl ToolT for BufferTool {
        fn name(&self) -> &str {
            "buffer"
        }

        fn description(&self) -> &str {
            "Buffer a WKT geometry by a distance"
        }

        fn args_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "geometry": {"type": "string"},
                    "distance": {"type": "number"}
                },
                "required": ["geometry", "distance"]
            })
        }

        async fn run(&self, args: Value) -> Result<Value, ToolCallError> {
            if self.should_fail {
                return Err(ToolCallError::RuntimeError(
                    "invalid geometry".to_string().into(),
                ));
            }
            let input: BufferInput = serde_json::from_value(args)?;
            Ok(json!({"geometry": input.geometry, "distance": input.distance}))
        }
    }

    #[test]
    fn test_tool_call_error_runtime_error() {
        let error = ToolCallError::RuntimeError("Runtime error".to_string().into());
        assert_eq!(error.to_string(), "Runtime Error Runtime error");
    }

    #[test]
    fn test_tool_call_error_serde_error() {
        let json_error = serde_json::from_str::<Value>("invalid json").unwrap_err();
        let error = ToolCallError::SerdeError(json_error);
        assert!(error.to_string().contains("Serde Error"));
    }

    #[test]
    fn test_tool_descriptor_from_tool() {
        let tool: Arc<dyn ToolT> = Arc::new(BufferTool { should_fail: false });
        let descriptor = Tool::from(tool.as_ref());

        assert_eq!(descriptor.tool_type, "function");
        assert_eq!(descriptor.function.name, "buffer");
        assert_eq!(
            descriptor.function.description,
            "Buffer a WKT geometry by a distance"
        );
        assert_eq!(descriptor.function.parameters["required"][1], "distance");
    }

    #[tokio::test]
    async fn test_tool_run_success() {
        let tool = BufferTool { should_fail: false };
        let out = tool
            .run(json!({"geometry": "POINT (1 2)", "distance": 5.0}))
            .await
            .unwrap();
        assert_eq!(out["geometry"], "POINT (1 2)");
        assert_eq!(out["distance"], 5.0);
    }

    #[tokio::test]
    async fn test_tool_run_bad_arguments() {
        let tool = BufferTool { should_fail: false };
        let err = tool.run(json!({"geometry": 1})).await.unwrap_err();
        assert!(matches!(err, ToolCallError::SerdeError(_)));
    }

    #[tokio::test]
    async fn test_tool_run_failure() {
        let tool = BufferTool { should_fail: true };
        let err = tool.run(json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "Runtime Error invalid geometry");
    }

    #[test]
    fn test_tool_call_result_content() {
        let text = ToolCallResult {
            tool_name: "area".to_string(),
            success: true,
            arguments: json!({}),
            result: Value::String("12.5".to_string()),
        };
        assert_eq!(text.content(), "12.5");

        let object = ToolCallResult {
            result: json!({"error": "boom"}),
            ..text
        };
        assert_eq!(object.content(), r#"{"error":"boom"}"#);
    }
}
