use super::ToolT;
use async_trait::async_trait;
use std::sync::Arc;

/// Tools discovered for one session. Loaded once, never refreshed.
pub type ToolSet = Vec<Arc<dyn ToolT>>;

#[derive(Debug, thiserror::Error)]
pub enum ToolSetError {
    #[error("Failed to connect to tool server at {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Tool discovery failed: {0}")]
    Discovery(String),

    #[error("Tool server at {url} exposes no tools")]
    Empty { url: String },
}

/// Source of the tools an orchestrator is allowed to call.
///
/// `load_tools` performs one discovery attempt per call; callers decide
/// whether to retry.
#[async_trait]
pub trait ToolSetProvider: Send + Sync {
    /// Human-readable location of the tools, used in diagnostics.
    fn endpoint(&self) -> &str;

    async fn load_tools(&self) -> Result<ToolSet, ToolSetError>;
}
