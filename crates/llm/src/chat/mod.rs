use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::{error::LLMError, ToolCall};

/// Role of a participant in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Display, EnumString)]
pub enum ChatRole {
    /// System instruction
    #[strum(serialize = "system")]
    System,
    /// The user/human participant in the conversation
    #[strum(serialize = "user")]
    User,
    /// The AI assistant participant in the conversation
    #[strum(serialize = "assistant")]
    Assistant,
    /// Tool/function response
    #[strum(serialize = "tool")]
    Tool,
}

/// The type of a message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum MessageType {
    /// A text message
    #[default]
    Text,
    /// The assistant asking for one or more tool invocations
    ToolUse(Vec<ToolCall>),
    /// Tool outputs; each entry carries its output in `function.arguments`
    ToolResult(Vec<ToolCall>),
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of who sent this message
    pub role: ChatRole,
    /// The type of the message (plain text, tool use, tool result)
    pub message_type: MessageType,
    /// The text content of the message
    pub content: String,
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message_type {
            MessageType::Text => write!(f, "{}: {}", self.role, self.content),
            MessageType::ToolUse(calls) | MessageType::ToolResult(calls) => {
                let names = calls
                    .iter()
                    .map(|c| c.function.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                if self.content.is_empty() {
                    write!(f, "{}: [{names}]", self.role)
                } else {
                    write!(f, "{}: {} [{names}]", self.role, self.content)
                }
            }
        }
    }
}

/// Represents a function definition for a tool.
///
/// `parameters` holds the JSON Schema of the arguments as a raw value, since
/// schemas discovered from a remote server can be arbitrarily nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    /// Name of the function
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema describing the parameters
    pub parameters: Value,
}

/// Represents a tool that can be used in chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// The type of tool (always "function" for now)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function definition
    pub function: FunctionTool,
}

impl Tool {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Tool {
            tool_type: "function".to_string(),
            function: FunctionTool {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

pub trait ChatResponse: std::fmt::Debug + std::fmt::Display + Send + Sync {
    fn text(&self) -> Option<String>;
    fn tool_calls(&self) -> Option<Vec<ToolCall>>;
}

/// Trait for providers that support chat-style interactions.
#[async_trait]
pub trait ChatProvider: Sync + Send {
    /// Sends a chat request without any tools attached.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, LLMError> {
        self.chat_with_tools(messages, None).await
    }

    /// Sends a chat request with the given tool descriptors.
    ///
    /// The response may contain tool calls instead of (or alongside) text.
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Tool]>,
    ) -> Result<Box<dyn ChatResponse>, LLMError>;
}

impl ChatMessage {
    /// Create a new builder for a user message
    pub fn user() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::User)
    }

    /// Create a new builder for an assistant message
    pub fn assistant() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::Assistant)
    }

    /// Create a new builder for a system message
    pub fn system() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::System)
    }

    /// Create a new builder for a tool message
    pub fn tool() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::Tool)
    }
}

/// Builder for ChatMessage
#[derive(Debug)]
pub struct ChatMessageBuilder {
    role: ChatRole,
    message_type: MessageType,
    content: String,
}

impl ChatMessageBuilder {
    /// Create a new ChatMessageBuilder with specified role
    pub fn new(role: ChatRole) -> Self {
        Self {
            role,
            message_type: MessageType::default(),
            content: String::new(),
        }
    }

    /// Set the message content
    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = content.into();
        self
    }

    /// Set the message type as ToolUse
    pub fn tool_use(mut self, tools: Vec<ToolCall>) -> Self {
        self.message_type = MessageType::ToolUse(tools);
        self
    }

    /// Set the message type as ToolResult
    pub fn tool_result(mut self, tools: Vec<ToolCall>) -> Self {
        self.message_type = MessageType::ToolResult(tools);
        self
    }

    /// Build the ChatMessage
    pub fn build(self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            message_type: self.message_type,
            content: self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FunctionCall;
    use serde_json::json;
    use std::str::FromStr;

    fn call(id: &str, name: &str, args: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: args.to_string(),
            },
        }
    }

    #[test]
    fn test_chat_role_display_and_parse() {
        assert_eq!(ChatRole::Assistant.to_string(), "assistant");
        assert_eq!(ChatRole::from_str("tool").unwrap(), ChatRole::Tool);
        assert!(ChatRole::from_str("robot").is_err());
    }

    #[test]
    fn test_message_type_default() {
        assert_eq!(MessageType::default(), MessageType::Text);
    }

    #[test]
    fn test_chat_message_builder_roles() {
        let message = ChatMessage::user().content("Hello, world!").build();
        assert_eq!(message.role, ChatRole::User);
        assert_eq!(message.content, "Hello, world!");
        assert_eq!(message.message_type, MessageType::Text);

        let message = ChatMessage::system().content("be brief").build();
        assert_eq!(message.role, ChatRole::System);
    }

    #[test]
    fn test_chat_message_builder_tool_use() {
        let calls = vec![call("call_1", "buffer", r#"{"distance": 10}"#)];
        let message = ChatMessage::assistant().tool_use(calls.clone()).build();

        assert_eq!(message.role, ChatRole::Assistant);
        assert_eq!(message.message_type, MessageType::ToolUse(calls));
    }

    #[test]
    fn test_chat_message_display_text() {
        let message = ChatMessage::tool().content("area = 12.5").build();
        assert_eq!(message.to_string(), "tool: area = 12.5");
    }

    #[test]
    fn test_chat_message_display_tool_result() {
        let message = ChatMessage::tool()
            .tool_result(vec![
                call("call_1", "get_area", "12.5"),
                call("call_2", "get_length", "3"),
            ])
            .build();
        assert_eq!(message.to_string(), "tool: [get_area, get_length]");
    }

    #[test]
    fn test_tool_serialization() {
        let tool = Tool::function("buffer", "Buffer a geometry", json!({"type": "object"}));

        let serialized = serde_json::to_value(&tool).unwrap();
        assert_eq!(serialized["type"], "function");
        assert_eq!(serialized["function"]["name"], "buffer");
        assert_eq!(serialized["function"]["parameters"]["type"], "object");
    }

    #[tokio::test]
    async fn test_chat_provider_default_chat_passes_no_tools() {
        struct EchoProvider;

        #[derive(Debug)]
        struct EchoResponse(String);

        impl fmt::Display for EchoResponse {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ChatResponse for EchoResponse {
            fn text(&self) -> Option<String> {
                Some(self.0.clone())
            }

            fn tool_calls(&self) -> Option<Vec<ToolCall>> {
                None
            }
        }

        #[async_trait]
        impl ChatProvider for EchoProvider {
            async fn chat_with_tools(
                &self,
                messages: &[ChatMessage],
                tools: Option<&[Tool]>,
            ) -> Result<Box<dyn ChatResponse>, LLMError> {
                Ok(Box::new(EchoResponse(format!(
                    "{} tools={}",
                    messages.len(),
                    tools.is_some()
                ))))
            }
        }

        let messages = vec![ChatMessage::user().content("Test").build()];
        let response = EchoProvider.chat(&messages).await.unwrap();
        assert_eq!(response.text(), Some("1 tools=false".to_string()));
    }
}
