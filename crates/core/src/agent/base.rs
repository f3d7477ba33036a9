use super::{AgentError, AgentRunResult};
use async_trait::async_trait;
use geoagent_llm::chat::ChatMessage;

/// Binds a model to a tool set and answers one conversation at a time.
///
/// `invoke` receives the conversation to answer and returns it extended with
/// everything the orchestrator produced on the way to its reply.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn invoke(&self, messages: Vec<ChatMessage>) -> Result<AgentRunResult, AgentError>;
}
