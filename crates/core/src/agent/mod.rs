mod base;
mod error;
mod executor;
pub mod react;
mod result;

pub use base::Orchestrator;
pub use error::{AgentBuildError, AgentError};
pub use executor::{ExecutorConfig, TurnResult};
pub use react::{AgentBuilder, ReActAgent};
pub use result::{extract_reply, AgentRunResult, NO_RESPONSE};
