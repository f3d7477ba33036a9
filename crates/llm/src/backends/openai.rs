//! OpenAI-compatible chat-completions backend.
//!
//! Works against any endpoint that speaks the `/chat/completions` dialect
//! with function tools (OpenAI, OpenRouter, vLLM, ...).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Url;

use crate::{
    builder::LLMBuilder,
    chat::{ChatMessage, ChatProvider, ChatResponse, Tool},
    common::openai_types::{OpenAIStyleChatCompletionRequest, OpenAIStyleChatCompletionResponse},
    error::LLMError,
    LLMProvider, ToolCall,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Client for an OpenAI-compatible chat endpoint.
pub struct OpenAI {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
    client: reqwest::Client,
}

impl fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAI")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

/// Response of a single chat completion.
#[derive(Debug, Clone, Default)]
pub struct OpenAIChatResponse {
    pub text: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub finish_reason: Option<String>,
}

impl fmt::Display for OpenAIChatResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.text, &self.tool_calls) {
            (Some(text), _) => write!(f, "{text}"),
            (None, Some(calls)) => {
                for call in calls {
                    write!(f, "{}({})", call.function.name, call.function.arguments)?;
                }
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }
}

impl ChatResponse for OpenAIChatResponse {
    fn text(&self) -> Option<String> {
        self.text.clone()
    }

    fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.tool_calls.clone()
    }
}

impl OpenAI {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, LLMError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| LLMError::InvalidRequest(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
            temperature,
            timeout_seconds,
            client,
        })
    }

    fn chat_url(&self) -> Result<Url, LLMError> {
        self.base_url
            .join("chat/completions")
            .map_err(|e| LLMError::InvalidRequest(format!("Invalid chat URL: {e}")))
    }
}

/// `Url::join` drops the last path segment unless it ends with `/`.
fn parse_base_url(raw: &str) -> Result<Url, LLMError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| LLMError::InvalidRequest(format!("Invalid base URL '{raw}': {e}")))
}

/// Turns a raw chat-completions body into a response.
pub fn parse_chat_response(body: &str) -> Result<OpenAIChatResponse, LLMError> {
    let parsed: OpenAIStyleChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| LLMError::ResponseFormatError {
            message: format!("Failed to decode OpenAI response: {e}"),
            raw_response: body.to_string(),
        })?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::ProviderError("No choices in response".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .filter(|calls| !calls.is_empty())
        .map(|calls| calls.into_iter().map(ToolCall::from).collect());

    Ok(OpenAIChatResponse {
        text: choice.message.content,
        tool_calls,
        finish_reason: choice.finish_reason,
    })
}

#[async_trait]
impl ChatProvider for OpenAI {
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Tool]>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        if self.api_key.is_empty() {
            return Err(LLMError::AuthError("Missing OpenAI API key".to_string()));
        }

        let body = OpenAIStyleChatCompletionRequest::new(&self.model, messages)
            .set_tools(tools)
            .set_max_tokens(self.max_tokens)
            .set_temperature(self.temperature);

        let url = self.chat_url()?;
        debug!(
            "POST {url} model={} messages={} tools={}",
            self.model,
            body.messages.len(),
            body.tools.map_or(0, |t| t.len())
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(LLMError::AuthError(text));
        }
        if !status.is_success() {
            return Err(LLMError::ResponseFormatError {
                message: format!("OpenAI API returned error status: {status}"),
                raw_response: text,
            });
        }

        let parsed = parse_chat_response(&text)?;
        debug!(
            "OpenAI finish_reason={:?} tool_calls={}",
            parsed.finish_reason,
            parsed.tool_calls.as_ref().map_or(0, |c| c.len())
        );
        Ok(Box::new(parsed))
    }
}

impl LLMProvider for OpenAI {
    fn model_name(&self) -> &str {
        &self.model
    }
}

impl LLMBuilder<OpenAI> {
    pub fn build(self) -> Result<std::sync::Arc<OpenAI>, LLMError> {
        let api_key = self.api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
            LLMError::InvalidRequest("No API key provided for OpenAI".to_string())
        })?;

        let mut openai = OpenAI::new(
            api_key,
            self.base_url,
            self.model,
            self.max_tokens,
            self.temperature,
            self.timeout_seconds,
        )?;
        if let Some(client) = self.client {
            openai.client = client;
        }

        Ok(std::sync::Arc::new(openai))
    }
}
