use async_trait::async_trait;
use geoagent_core::agent::{AgentError, AgentRunResult, Orchestrator};
use geoagent_llm::{chat::ChatMessage, error::LLMError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Orchestrator answering from a script of replies or failures.
///
/// A successful reply returns the input followed by one assistant message.
/// Once the script runs dry it answers "Mock response".
#[derive(Debug, Default)]
pub struct MockOrchestrator {
    script: Mutex<VecDeque<Result<String, String>>>,
    received: Mutex<Vec<Vec<ChatMessage>>>,
    hang: bool,
}

impl MockOrchestrator {
    pub fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    /// Never finishes a call; for exercising interrupts.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    /// Message lists passed to `invoke`, in call order.
    pub fn received(&self) -> Vec<Vec<ChatMessage>> {
        self.received.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl Orchestrator for MockOrchestrator {
    async fn invoke(&self, messages: Vec<ChatMessage>) -> Result<AgentRunResult, AgentError> {
        self.received.lock().unwrap().push(messages.clone());
        if self.hang {
            std::future::pending::<()>().await;
        }

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Mock response".to_string()));

        match next {
            Ok(reply) => {
                let mut out = messages;
                out.push(ChatMessage::assistant().content(reply).build());
                Ok(AgentRunResult::new(out))
            }
            Err(message) => Err(AgentError::LLMError(LLMError::ProviderError(message))),
        }
    }
}
