//! Model client layer: chat message types, the [`chat::ChatProvider`] seam
//! and an OpenAI-compatible chat-completions backend.

use serde::{Deserialize, Serialize};

pub mod backends;
pub mod builder;
pub mod chat;
pub(crate) mod common;
pub mod error;

pub use chat::ChatProvider;

/// A model client usable by an agent.
pub trait LLMProvider: ChatProvider {
    /// Model identifier sent with every request.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id, echoed back with the tool result.
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

/// Name and raw JSON arguments of a requested call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}
