//! Assembles a ready-to-run orchestrator.
//!
//! Order: model client, tool provider, a single tool discovery attempt,
//! then the orchestrator. Any failure stops the sequence where it happened.
//! A [`Config`] can only exist with an API key, so key validation always
//! comes first.

use crate::config::{Config, ConfigError};
use geoagent_core::agent::{AgentBuildError, AgentBuilder, ReActAgent};
use geoagent_core::mcp::McpToolSetProvider;
use geoagent_core::protocol::Event;
use geoagent_core::tool::{ToolSetError, ToolSetProvider};
use geoagent_llm::backends::openai::OpenAI;
use geoagent_llm::builder::LLMBuilder;
use geoagent_llm::error::LLMError;
use geoagent_llm::LLMProvider;
use log::info;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const SYSTEM_PROMPT: &str = "You are a GIS assistant with access to geospatial tools. \
Use the tools for geometry operations, coordinate transformations, spatial analysis and \
measurements instead of estimating results yourself. Geometries are exchanged as WKT. \
Explain results briefly and state the units of any measurement.";

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create model client: {0}")]
    Model(#[from] LLMError),

    #[error("Could not load tools from {endpoint}: {source}")]
    Tools {
        endpoint: String,
        #[source]
        source: ToolSetError,
    },

    #[error("Failed to build agent: {0}")]
    Agent(#[from] AgentBuildError),
}

/// Output of a successful startup.
pub struct Started {
    pub config: Config,
    pub orchestrator: Arc<ReActAgent>,
}

impl Started {
    /// Names of the discovered tools, in discovery order.
    pub fn tool_names(&self) -> Vec<String> {
        self.orchestrator
            .tools()
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }
}

pub fn build_llm(config: &Config) -> Result<Arc<OpenAI>, LLMError> {
    let mut builder = LLMBuilder::<OpenAI>::new()
        .api_key(config.api_key.clone())
        .model(config.model.clone());
    if let Some(base_url) = &config.base_url {
        builder = builder.base_url(base_url.clone());
    }
    if let Some(timeout) = config.timeout_seconds {
        builder = builder.timeout_seconds(timeout);
    }
    builder.build()
}

/// Discovers tools once and binds them to `llm`.
pub async fn assemble(
    config: &Config,
    llm: Arc<dyn LLMProvider>,
    provider: &dyn ToolSetProvider,
    events: Option<mpsc::Sender<Event>>,
) -> Result<Arc<ReActAgent>, StartupError> {
    let tools = provider
        .load_tools()
        .await
        .map_err(|source| StartupError::Tools {
            endpoint: provider.endpoint().to_string(),
            source,
        })?;
    if tools.is_empty() {
        return Err(StartupError::Tools {
            endpoint: provider.endpoint().to_string(),
            source: ToolSetError::Empty {
                url: provider.endpoint().to_string(),
            },
        });
    }
    info!("Loaded {} tools from {}", tools.len(), provider.endpoint());

    let mut builder = AgentBuilder::new(SYSTEM_PROMPT)
        .with_llm(llm)
        .with_tools(tools)
        .max_turns(config.max_turns);
    if let Some(tx) = events {
        builder = builder.with_event_sender(tx);
    }
    Ok(Arc::new(builder.build()?))
}

/// Builds the model client, then discovers tools from `provider`.
pub async fn start_with(
    config: Config,
    provider: &dyn ToolSetProvider,
    events: Option<mpsc::Sender<Event>>,
) -> Result<Started, StartupError> {
    let llm = build_llm(&config)?;
    info!("Model client ready ({})", llm.model_name());
    let orchestrator = assemble(&config, llm, provider, events).await?;
    Ok(Started {
        config,
        orchestrator,
    })
}

/// Startup against the MCP server named in `config`.
///
/// The provider handle is only created once the model client exists.
pub async fn start(
    config: Config,
    events: Option<mpsc::Sender<Event>>,
) -> Result<Started, StartupError> {
    let llm = build_llm(&config)?;
    info!("Model client ready ({})", llm.model_name());
    let provider = McpToolSetProvider::new(config.mcp_url.clone());
    let orchestrator = assemble(&config, llm, &provider, events).await?;
    Ok(Started {
        config,
        orchestrator,
    })
}
