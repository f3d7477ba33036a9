use geoagent_llm::chat::{ChatMessage, ChatRole};
use serde::{Deserialize, Serialize};

/// Reply used when an orchestrator produced no messages at all.
pub const NO_RESPONSE: &str = "no response generated";

/// Messages produced by one orchestrator invocation.
///
/// Holds the input conversation followed by every generated message, in
/// order. The system instruction is not included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRunResult {
    pub messages: Vec<ChatMessage>,
}

impl AgentRunResult {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// The text to show the user for this run.
    pub fn final_text(&self) -> String {
        extract_reply(&self.messages)
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}

/// Picks the reply out of a message sequence.
///
/// The newest assistant message wins even when tool or user messages follow
/// it. Without any assistant message the newest message is rendered whole;
/// an empty sequence yields [`NO_RESPONSE`].
pub fn extract_reply(messages: &[ChatMessage]) -> String {
    if let Some(msg) = messages.iter().rev().find(|m| m.role == ChatRole::Assistant) {
        return msg.content.clone();
    }
    match messages.last() {
        Some(last) => last.to_string(),
        None => NO_RESPONSE.to_string(),
    }
}
