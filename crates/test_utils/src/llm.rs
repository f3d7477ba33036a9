use async_trait::async_trait;
use geoagent_llm::{
    chat::{ChatMessage, ChatProvider, ChatResponse, Tool},
    error::LLMError,
    FunctionCall, LLMProvider, ToolCall,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted model answer.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    ToolCalls(Vec<ToolCall>),
    Error(String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }
}

pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        call_type: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

// Mock LLM Provider answering from a script, "Mock response" once it runs dry
#[derive(Default)]
pub struct MockLLMProvider {
    script: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    tools_seen: Mutex<Vec<Vec<String>>>,
}

impl MockLLMProvider {
    pub fn new(script: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    /// Every message list the provider was asked about, in call order.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    /// Tool names attached to each call.
    pub fn tools_seen(&self) -> Vec<Vec<String>> {
        self.tools_seen.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatProvider for MockLLMProvider {
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Tool]>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.tools_seen.lock().unwrap().push(
            tools
                .unwrap_or_default()
                .iter()
                .map(|t| t.function.name.clone())
                .collect(),
        );

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockReply::text("Mock response"));

        match reply {
            MockReply::Text(text) => Ok(Box::new(MockChatResponse {
                text: Some(text),
                tool_calls: None,
            })),
            MockReply::ToolCalls(calls) => Ok(Box::new(MockChatResponse {
                text: None,
                tool_calls: Some(calls),
            })),
            MockReply::Error(message) => Err(LLMError::ProviderError(message)),
        }
    }
}

impl LLMProvider for MockLLMProvider {
    fn model_name(&self) -> &str {
        "mock"
    }
}

pub struct MockChatResponse {
    pub text: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatResponse for MockChatResponse {
    fn text(&self) -> Option<String> {
        self.text.clone()
    }

    fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.tool_calls.clone()
    }
}

impl std::fmt::Debug for MockChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockChatResponse")
    }
}

impl std::fmt::Display for MockChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text.as_deref().unwrap_or(""))
    }
}
