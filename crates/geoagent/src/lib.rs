// Re-export for convenience
pub use async_trait::async_trait;

pub use geoagent_core::{self as core, SessionError};
pub use geoagent_llm::{self as llm, error as llm_error};

pub mod config;
#[cfg(feature = "mcp")]
pub mod startup;

/// Installs `env_logger`, filtered by `RUST_LOG` and defaulting to `warn`.
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "logging")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_available() {
        let error = llm_error::LLMError::AuthError("test error".to_string());
        assert_eq!(error.to_string(), "Auth Error: test error");
    }

    #[test]
    fn test_chat_message_builder() {
        let message = llm::chat::ChatMessage::user()
            .content("Hello world")
            .build();

        assert_eq!(message.role, llm::chat::ChatRole::User);
        assert_eq!(message.content, "Hello world");
    }

    #[test]
    fn test_reply_extraction_available() {
        let result = core::agent::AgentRunResult::default();
        assert_eq!(result.final_text(), core::agent::NO_RESPONSE);
    }

    #[test]
    fn test_tool_types_available() {
        let tool_result = core::tool::ToolCallResult {
            tool_name: "get_length".to_string(),
            success: true,
            arguments: serde_json::json!({"geometry": "LINESTRING (0 0, 3 4)"}),
            result: serde_json::json!("5.0"),
        };

        assert_eq!(tool_result.tool_name, "get_length");
        assert_eq!(tool_result.content(), "5.0");
    }
}
