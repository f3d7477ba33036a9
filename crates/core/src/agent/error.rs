use geoagent_llm::error::LLMError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LLMError(#[from] LLMError),

    #[error("Maximum turns exceeded: {max_turns}")]
    MaxTurnsExceeded { max_turns: usize },
}

#[derive(Debug, Error)]
pub enum AgentBuildError {
    #[error("Build Failure: {0}")]
    BuildFailure(String),
}
