use crate::chat::{ChatMessage, ChatRole, MessageType, Tool};
use crate::{FunctionCall, ToolCall};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIStyleMessage {
    pub role: String,
    /// `None` only for assistant messages that carry tool calls.
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAIStyleToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl OpenAIStyleMessage {
    fn text(role: &ChatRole, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Maps one chat message onto the wire. A tool-result message fans out
    /// into one `tool` message per call id.
    pub fn from_chat_message(message: &ChatMessage) -> Vec<Self> {
        match &message.message_type {
            MessageType::Text => vec![Self::text(&message.role, message.content.clone())],
            MessageType::ToolUse(calls) => vec![Self {
                role: ChatRole::Assistant.to_string(),
                content: if message.content.is_empty() {
                    None
                } else {
                    Some(message.content.clone())
                },
                tool_calls: Some(calls.iter().map(OpenAIStyleToolCall::from).collect()),
                tool_call_id: None,
            }],
            MessageType::ToolResult(results) => results
                .iter()
                .map(|result| Self {
                    role: ChatRole::Tool.to_string(),
                    content: Some(result.function.arguments.clone()),
                    tool_calls: None,
                    tool_call_id: Some(result.id.clone()),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIStyleToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_call_type")]
    pub tool_type: String,
    pub function: OpenAIStyleToolCallFunction,
}

fn default_call_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIStyleToolCallFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl From<&ToolCall> for OpenAIStyleToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            tool_type: call.call_type.clone(),
            function: OpenAIStyleToolCallFunction {
                name: call.function.name.clone(),
                arguments: call.function.arguments.clone(),
            },
        }
    }
}

impl From<OpenAIStyleToolCall> for ToolCall {
    fn from(call: OpenAIStyleToolCall) -> Self {
        Self {
            id: call.id,
            call_type: call.tool_type,
            function: FunctionCall {
                name: call.function.name,
                arguments: call.function.arguments,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OpenAIStyleChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<OpenAIStyleMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<&'a [Tool]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

impl<'a> OpenAIStyleChatCompletionRequest<'a> {
    pub fn new(model: &'a str, messages: &[ChatMessage]) -> Self {
        Self {
            model,
            messages: messages
                .iter()
                .flat_map(OpenAIStyleMessage::from_chat_message)
                .collect(),
            tools: None,
            max_tokens: None,
            temperature: None,
            stream: false,
        }
    }

    pub fn set_tools(mut self, tools: Option<&'a [Tool]>) -> Self {
        // An empty tools array is rejected by the API.
        self.tools = tools.filter(|t| !t.is_empty());
        self
    }

    pub fn set_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn set_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenAIStyleChatChoice {
    pub message: OpenAIStyleResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIStyleResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<OpenAIStyleToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIStyleChatCompletionResponse {
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAIStyleChatChoice>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

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
    fn test_text_message_on_the_wire() {
        let message = ChatMessage::user().content("hello").build();
        let wire = OpenAIStyleMessage::from_chat_message(&message);

        assert_eq!(wire.len(), 1);
        assert_eq!(
            serde_json::to_value(&wire[0]).unwrap(),
            json!({"role": "user", "content": "hello"})
        );
    }

    #[test]
    fn test_tool_use_message_has_null_content() {
        let message = ChatMessage::assistant()
            .tool_use(vec![call("call_1", "get_centroid", r#"{"geometry":"POINT (1 2)"}"#)])
            .build();
        let wire = serde_json::to_value(&OpenAIStyleMessage::from_chat_message(&message)[0])
            .unwrap();

        assert_eq!(wire["role"], "assistant");
        assert!(wire["content"].is_null());
        assert_eq!(wire["tool_calls"][0]["id"], "call_1");
        assert_eq!(wire["tool_calls"][0]["type"], "function");
        assert_eq!(wire["tool_calls"][0]["function"]["name"], "get_centroid");
    }

    #[test]
    fn test_tool_result_fans_out_per_call() {
        let message = ChatMessage::tool()
            .tool_result(vec![call("call_1", "a", "one"), call("call_2", "b", "two")])
            .build();
        let wire = OpenAIStyleMessage::from_chat_message(&message);

        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].role, "tool");
        assert_eq!(wire[0].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(wire[1].content.as_deref(), Some("two"));
    }

    #[test]
    fn test_request_skips_empty_tools() {
        let messages = vec![ChatMessage::user().content("hi").build()];
        let no_tools: Vec<Tool> = Vec::new();
        let request = OpenAIStyleChatCompletionRequest::new("gpt-4o-mini", &messages)
            .set_tools(Some(no_tools.as_slice()));

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("tools").is_none());
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_response_with_tool_calls_parses() {
        let raw = json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 0,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "buffer", "arguments": "{\"distance\":5}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });

        let response: OpenAIStyleChatCompletionResponse = serde_json::from_value(raw).unwrap();
        let choice = &response.choices[0];
        assert_eq!(choice.finish_reason.as_deref(), Some("tool_calls"));
        let calls = choice.message.tool_calls.clone().unwrap();
        let call: ToolCall = calls[0].clone().into();
        assert_eq!(call.function.name, "buffer");
        assert_eq!(call.function.arguments, "{\"distance\":5}");
    }
}
