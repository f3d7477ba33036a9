use async_trait::async_trait;
use geoagent_core::tool::{ToolCallError, ToolSet, ToolSetError, ToolSetProvider, ToolT};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Tool that echoes its arguments back, or fails with a fixed message.
#[derive(Debug)]
pub struct MockTool {
    pub name: String,
    pub description: String,
    pub failure: Option<String>,
    calls: Mutex<Vec<Value>>,
}

impl MockTool {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(name, "always fails")
        }
    }

    /// Arguments of every run, in call order.
    pub fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolT for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "geometry": {"type": "string"}
            }
        })
    }

    async fn run(&self, args: Value) -> Result<Value, ToolCallError> {
        self.calls.lock().unwrap().push(args.clone());
        match &self.failure {
            Some(message) => Err(ToolCallError::RuntimeError(message.clone().into())),
            None => Ok(json!({ "tool": self.name, "echo": args })),
        }
    }
}

#[derive(Debug, Clone)]
pub enum MockToolSetOutcome {
    /// Discovery succeeds with these tools; an empty list is returned as-is.
    Tools(Vec<String>),
    /// Discovery succeeds but lists nothing.
    Empty,
    /// The provider itself reports an empty server.
    EmptyError,
    ConnectFailure(String),
}

/// Tool-set provider that counts its discovery attempts.
#[derive(Debug)]
pub struct MockToolSetProvider {
    outcome: MockToolSetOutcome,
    attempts: AtomicUsize,
}

impl MockToolSetProvider {
    pub fn with_tools(names: &[&str]) -> Self {
        Self::new(MockToolSetOutcome::Tools(
            names.iter().map(|n| n.to_string()).collect(),
        ))
    }

    pub fn new(outcome: MockToolSetOutcome) -> Self {
        Self {
            outcome,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolSetProvider for MockToolSetProvider {
    fn endpoint(&self) -> &str {
        "mock://tools"
    }

    async fn load_tools(&self) -> Result<ToolSet, ToolSetError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            MockToolSetOutcome::Tools(names) => Ok(names
                .iter()
                .map(|n| Arc::new(MockTool::new(n, "mock tool")) as Arc<dyn ToolT>)
                .collect()),
            MockToolSetOutcome::Empty => Ok(Vec::new()),
            MockToolSetOutcome::EmptyError => Err(ToolSetError::Empty {
                url: self.endpoint().to_string(),
            }),
            MockToolSetOutcome::ConnectFailure(message) => Err(ToolSetError::Connect {
                url: self.endpoint().to_string(),
                message: message.clone(),
            }),
        }
    }
}
