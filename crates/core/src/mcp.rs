//! MCP tool source: connects to a remote MCP server over streamable HTTP
//! and exposes its tools as [`ToolT`] objects.
//!
//! All tools discovered in one [`McpToolSetProvider::load_tools`] call share
//! the same connected peer, which stays open as long as any tool is alive.

use crate::tool::{ToolCallError, ToolSet, ToolSetError, ToolSetProvider, ToolT};
use async_trait::async_trait;
use log::{debug, info};
use rmcp::{
    model::{CallToolRequestParams, RawContent},
    service::{RoleClient, RunningService},
    transport::StreamableHttpClientTransport,
    ServiceExt,
};
use serde_json::{Map, Value};
use std::sync::Arc;

type McpPeer = RunningService<RoleClient, ()>;

/// Loads tools from an MCP server reachable at `url`.
#[derive(Debug, Clone)]
pub struct McpToolSetProvider {
    url: String,
}

impl McpToolSetProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl ToolSetProvider for McpToolSetProvider {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn load_tools(&self) -> Result<ToolSet, ToolSetError> {
        info!("Connecting to MCP server at {}", self.url);
        let transport = StreamableHttpClientTransport::from_uri(self.url.as_str());
        let peer: McpPeer = ().serve(transport).await.map_err(|e| ToolSetError::Connect {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        let mcp_tools = peer
            .list_all_tools()
            .await
            .map_err(|e| ToolSetError::Discovery(e.to_string()))?;
        if mcp_tools.is_empty() {
            return Err(ToolSetError::Empty {
                url: self.url.clone(),
            });
        }
        info!("Discovered {} MCP tools", mcp_tools.len());

        let peer = Arc::new(peer);
        Ok(mcp_tools
            .iter()
            .map(|t| Arc::new(McpTool::new(t, peer.clone())) as Arc<dyn ToolT>)
            .collect())
    }
}

/// One remote tool, invoked through `tools/call`.
pub struct McpTool {
    name: String,
    description: String,
    schema: Value,
    peer: Arc<McpPeer>,
}

impl std::fmt::Debug for McpTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl McpTool {
    fn new(mcp_tool: &rmcp::model::Tool, peer: Arc<McpPeer>) -> Self {
        let (name, description, schema) = convert_tool(mcp_tool);
        Self {
            name,
            description,
            schema,
            peer,
        }
    }
}

#[async_trait]
impl ToolT for McpTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn args_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn run(&self, args: Value) -> Result<Value, ToolCallError> {
        let params = call_params(&self.name, args)?;

        debug!("tools/call {}", self.name);
        let result = self
            .peer
            .call_tool(params)
            .await
            .map_err(|e| ToolCallError::RuntimeError(format!("MCP call failed: {e}").into()))?;

        let text = extract_text(&result.content);
        if result.is_error == Some(true) {
            return Err(ToolCallError::RuntimeError(text.into()));
        }
        match (text.is_empty(), result.structured_content) {
            (true, Some(structured)) => Ok(structured),
            _ => Ok(Value::String(text)),
        }
    }
}

/// Splits an MCP tool descriptor into name, description and parameter schema.
pub fn convert_tool(mcp_tool: &rmcp::model::Tool) -> (String, String, Value) {
    (
        mcp_tool.name.to_string(),
        mcp_tool
            .description
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        Value::Object(mcp_tool.input_schema.as_ref().clone()),
    )
}

fn call_params(name: &str, args: Value) -> Result<CallToolRequestParams, ToolCallError> {
    let params = CallToolRequestParams::new(name.to_string());
    Ok(match call_arguments(args)? {
        Some(arguments) => params.with_arguments(arguments),
        None => params,
    })
}

fn call_arguments(args: Value) -> Result<Option<Map<String, Value>>, ToolCallError> {
    match args {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => Err(ToolCallError::RuntimeError(
            format!("tool arguments must be a JSON object, got {other}").into(),
        )),
    }
}

/// Joins the text parts of an MCP result; other content kinds are skipped.
fn extract_text(content: &[rmcp::model::Content]) -> String {
    content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
