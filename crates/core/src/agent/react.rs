//! Bounded tool-calling loop.
//!
//! Each turn asks the model for the next step with every tool attached. Tool
//! requests are executed in order and their outputs fed back; a plain text
//! answer ends the invocation.

use super::{
    AgentBuildError, AgentError, AgentRunResult, ExecutorConfig, Orchestrator, TurnResult,
};
use crate::protocol::Event;
use crate::tool::{ToolCallResult, ToolSet, ToolT};
use async_trait::async_trait;
use geoagent_llm::chat::{ChatMessage, ChatRole, MessageType, Tool};
use geoagent_llm::{FunctionCall, LLMProvider, ToolCall};
use log::{debug, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Orchestrator that alternates between the model and its tools.
pub struct ReActAgent {
    llm: Arc<dyn LLMProvider>,
    tools: ToolSet,
    system_prompt: String,
    config: ExecutorConfig,
    tx_event: Option<mpsc::Sender<Event>>,
}

impl ReActAgent {
    pub fn tools(&self) -> &[Arc<dyn ToolT>] {
        &self.tools
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    async fn emit(&self, event: Event) {
        if let Some(tx) = &self.tx_event {
            let _ = tx.send(event).await;
        }
    }

    async fn process_tool_calls(&self, tool_calls: &[ToolCall]) -> Vec<ToolCallResult> {
        let mut results = Vec::with_capacity(tool_calls.len());

        for call in tool_calls {
            let tool_name = call.function.name.clone();
            let tool_args = call.function.arguments.clone();

            self.emit(Event::ToolCallRequested {
                id: call.id.clone(),
                tool_name: tool_name.clone(),
                arguments: tool_args.clone(),
            })
            .await;

            let outcome = match self.tools.iter().find(|t| t.name() == tool_name) {
                Some(tool) => match parse_arguments(&tool_args) {
                    Ok(parsed) => tool
                        .run(parsed.clone())
                        .await
                        .map(|output| (parsed, output))
                        .map_err(|e| e.to_string()),
                    Err(e) => Err(format!("Failed to parse arguments: {e}")),
                },
                None => {
                    warn!("Model requested unknown tool '{tool_name}'");
                    Err(format!("Tool '{tool_name}' not found"))
                }
            };

            let result = match outcome {
                Ok((arguments, output)) => {
                    debug!("Tool '{tool_name}' succeeded");
                    self.emit(Event::ToolCallCompleted {
                        id: call.id.clone(),
                        tool_name: tool_name.clone(),
                        result: output.clone(),
                    })
                    .await;
                    ToolCallResult {
                        tool_name,
                        success: true,
                        arguments,
                        result: output,
                    }
                }
                Err(error) => {
                    debug!("Tool '{tool_name}' failed: {error}");
                    self.emit(Event::ToolCallFailed {
                        id: call.id.clone(),
                        tool_name: tool_name.clone(),
                        error: error.clone(),
                    })
                    .await;
                    ToolCallResult {
                        tool_name,
                        success: false,
                        arguments: serde_json::from_str(&tool_args).unwrap_or(Value::Null),
                        result: json!({ "error": error }),
                    }
                }
            };

            results.push(result);
        }

        results
    }

    async fn process_turn(
        &self,
        messages: &mut Vec<ChatMessage>,
        tools: &[Tool],
    ) -> Result<TurnResult<String>, AgentError> {
        let response = self.llm.chat_with_tools(messages.as_slice(), Some(tools)).await?;
        let response_text = response.text().unwrap_or_default();

        match response.tool_calls() {
            Some(tool_calls) if !tool_calls.is_empty() => {
                let tool_results = self.process_tool_calls(&tool_calls).await;

                // Outputs travel back in `function.arguments`, keyed by call id.
                let result_tool_calls = tool_calls
                    .iter()
                    .zip(&tool_results)
                    .map(|(call, result)| ToolCall {
                        id: call.id.clone(),
                        call_type: call.call_type.clone(),
                        function: FunctionCall {
                            name: call.function.name.clone(),
                            arguments: result.content(),
                        },
                    })
                    .collect();

                messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    message_type: MessageType::ToolUse(tool_calls),
                    content: response_text.clone(),
                });
                messages.push(ChatMessage {
                    role: ChatRole::Tool,
                    message_type: MessageType::ToolResult(result_tool_calls),
                    content: String::new(),
                });

                Ok(TurnResult::Continue(
                    (!response_text.is_empty()).then_some(response_text),
                ))
            }
            _ => {
                messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    message_type: MessageType::Text,
                    content: response_text.clone(),
                });
                Ok(TurnResult::Complete(response_text))
            }
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(raw)
}

#[async_trait]
impl Orchestrator for ReActAgent {
    async fn invoke(&self, input: Vec<ChatMessage>) -> Result<AgentRunResult, AgentError> {
        let max_turns = self.config.max_turns;
        let tools: Vec<Tool> = self.tools.iter().map(|t| Tool::from(t.as_ref())).collect();

        // A caller-supplied system message takes precedence and is kept.
        let prepend_system = input.first().map(|m| &m.role) != Some(&ChatRole::System);
        let mut messages = Vec::with_capacity(input.len() + 1);
        if prepend_system {
            messages.push(ChatMessage::system().content(&self.system_prompt).build());
        }
        messages.extend(input);

        for turn in 0..max_turns {
            self.emit(Event::TurnStarted {
                turn_number: turn,
                max_turns,
            })
            .await;

            let turn_result = self.process_turn(&mut messages, &tools).await?;
            let final_turn = matches!(turn_result, TurnResult::Complete(_));

            self.emit(Event::TurnCompleted {
                turn_number: turn,
                final_turn,
            })
            .await;

            match turn_result {
                TurnResult::Complete(_) => {
                    if prepend_system {
                        messages.remove(0);
                    }
                    return Ok(AgentRunResult::new(messages));
                }
                TurnResult::Continue(Some(thought)) => {
                    debug!("Turn {turn}: {thought}");
                }
                TurnResult::Continue(None) => {}
            }
        }

        Err(AgentError::MaxTurnsExceeded { max_turns })
    }
}

/// Builder for [`ReActAgent`] with a fluent API.
pub struct AgentBuilder {
    system_prompt: String,
    tools: ToolSet,
    llm: Option<Arc<dyn LLMProvider>>,
    max_turns: usize,
    tx_event: Option<mpsc::Sender<Event>>,
}

impl AgentBuilder {
    /// Create a new agent builder with the system instruction the agent runs under.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            tools: Vec::new(),
            llm: None,
            max_turns: ExecutorConfig::default().max_turns,
            tx_event: None,
        }
    }

    /// Set the LLM provider for the agent
    pub fn with_llm(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Add a tool to this agent
    pub fn with_tool(mut self, tool: Arc<dyn ToolT>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Add multiple tools to this agent
    pub fn with_tools(mut self, tools: ToolSet) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Receive [`Event`]s while the agent works.
    pub fn with_event_sender(mut self, tx: mpsc::Sender<Event>) -> Self {
        self.tx_event = Some(tx);
        self
    }

    /// Build the agent with the configured settings
    ///
    /// Fails when no LLM provider was set, when no tools were given, or when
    /// `max_turns` is zero.
    pub fn build(self) -> Result<ReActAgent, AgentBuildError> {
        let llm = self
            .llm
            .ok_or_else(|| AgentBuildError::BuildFailure("LLM is not set".into()))?;
        if self.tools.is_empty() {
            return Err(AgentBuildError::BuildFailure(
                "at least one tool is required".into(),
            ));
        }
        if self.max_turns == 0 {
            return Err(AgentBuildError::BuildFailure(
                "max_turns must be at least 1".into(),
            ));
        }
        Ok(ReActAgent {
            llm,
            tools: self.tools,
            system_prompt: self.system_prompt,
            config: ExecutorConfig {
                max_turns: self.max_turns,
            },
            tx_event: self.tx_event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_arguments("").unwrap(), json!({}));
        assert_eq!(
            parse_arguments(r#"{"geometry":"POINT (0 0)"}"#).unwrap()["geometry"],
            "POINT (0 0)"
        );
        assert!(parse_arguments("{not json").is_err());
    }
}
