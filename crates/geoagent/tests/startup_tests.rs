use geoagent::config::{Config, ConfigError, API_KEY_VAR, BASE_URL_VAR, MAX_TURNS_VAR, MCP_URL_VAR};
use geoagent::core::agent::Orchestrator;
use geoagent::core::tool::ToolSetError;
use geoagent::llm::chat::ChatMessage;
use geoagent::startup::{assemble, start, start_with, StartupError};
use geoagent_test_utils::llm::{tool_call, MockLLMProvider, MockReply};
use geoagent_test_utils::tool::{MockToolSetOutcome, MockToolSetProvider};
use std::sync::Arc;

fn config_with_key() -> Config {
    Config::from_lookup(|key| match key {
        API_KEY_VAR => Some("sk-test".to_string()),
        MAX_TURNS_VAR => Some("3".to_string()),
        _ => None,
    })
    .unwrap()
}

/// Mirrors the binary: configuration first, then the rest of startup.
async fn startup(
    lookup: impl Fn(&str) -> Option<String>,
    provider: &MockToolSetProvider,
) -> Result<Vec<String>, StartupError> {
    let config = Config::from_lookup(lookup)?;
    let started = start_with(config, provider, None).await?;
    Ok(started.tool_names())
}

#[tokio::test]
async fn test_missing_key_aborts_before_tool_discovery() {
    let provider = MockToolSetProvider::with_tools(&["get_area"]);

    let err = startup(|_| None, &provider).await.unwrap_err();

    assert!(matches!(err, StartupError::Config(ConfigError::MissingApiKey)));
    assert!(err.to_string().contains("OPENAI_API_KEY"));
    assert_eq!(provider.attempts(), 0);
}

#[tokio::test]
async fn test_empty_tool_set_aborts_after_one_attempt() {
    let provider = MockToolSetProvider::new(MockToolSetOutcome::Empty);

    let err = start_with(config_with_key(), &provider, None)
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err,
        StartupError::Tools {
            source: ToolSetError::Empty { .. },
            ..
        }
    ));
    assert_eq!(provider.attempts(), 1);
}

#[tokio::test]
async fn test_provider_reported_empty_server_aborts_after_one_attempt() {
    let provider = MockToolSetProvider::new(MockToolSetOutcome::EmptyError);

    let err = start_with(config_with_key(), &provider, None)
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err,
        StartupError::Tools {
            source: ToolSetError::Empty { .. },
            ..
        }
    ));
    assert_eq!(provider.attempts(), 1);
}

#[tokio::test]
async fn test_empty_tool_list_from_assemble() {
    let provider = MockToolSetProvider::with_tools(&[]);
    let llm = Arc::new(MockLLMProvider::default());

    let err = assemble(&config_with_key(), llm.clone(), &provider, None)
        .await
        .err()
        .unwrap();

    assert!(err.to_string().contains("exposes no tools"));
    assert_eq!(provider.attempts(), 1);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_connect_failure_aborts_after_one_attempt() {
    let provider =
        MockToolSetProvider::new(MockToolSetOutcome::ConnectFailure("refused".to_string()));

    let err = start_with(config_with_key(), &provider, None)
        .await
        .err()
        .unwrap();

    assert!(err.to_string().contains("mock://tools"));
    assert!(err.to_string().contains("refused"));
    assert_eq!(provider.attempts(), 1);
}

#[tokio::test]
async fn test_successful_startup_lists_tools() {
    let provider = MockToolSetProvider::with_tools(&["get_area", "buffer", "transform"]);

    let started = start_with(config_with_key(), &provider, None).await.unwrap();

    assert_eq!(started.tool_names(), ["get_area", "buffer", "transform"]);
    assert_eq!(started.orchestrator.config().max_turns, 3);
    assert_eq!(started.config.model, "gpt-4o-mini");
    assert_eq!(provider.attempts(), 1);
}

#[tokio::test]
async fn test_assembled_orchestrator_calls_discovered_tools() {
    let provider = MockToolSetProvider::with_tools(&["get_area"]);
    let llm = Arc::new(MockLLMProvider::new(vec![
        MockReply::ToolCalls(vec![tool_call(
            "call_1",
            "get_area",
            r#"{"geometry":"POINT (0 0)"}"#,
        )]),
        MockReply::text("A point has no area."),
    ]));

    let orchestrator = assemble(&config_with_key(), llm.clone(), &provider, None)
        .await
        .unwrap();
    let result = orchestrator
        .invoke(vec![ChatMessage::user().content("area of POINT (0 0)?").build()])
        .await
        .unwrap();

    assert_eq!(result.final_text(), "A point has no area.");
    assert_eq!(llm.call_count(), 2);
    assert_eq!(llm.tools_seen()[0], ["get_area"]);
}

fn config_with_bad_base_url() -> Config {
    Config::from_lookup(|key| match key {
        API_KEY_VAR => Some("sk-test".to_string()),
        BASE_URL_VAR => Some("not a url".to_string()),
        // Nothing listens here; reaching discovery would report a tool error.
        MCP_URL_VAR => Some("http://127.0.0.1:9/mcp".to_string()),
        _ => None,
    })
    .unwrap()
}

#[tokio::test]
async fn test_model_client_failure_stops_before_discovery() {
    let provider = MockToolSetProvider::with_tools(&["get_area"]);

    let err = start_with(config_with_bad_base_url(), &provider, None)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, StartupError::Model(_)));
    assert_eq!(provider.attempts(), 0);
}

#[tokio::test]
async fn test_start_builds_model_client_before_connecting() {
    let err = start(config_with_bad_base_url(), None).await.err().unwrap();

    assert!(matches!(err, StartupError::Model(_)));
    assert!(err.to_string().contains("Invalid base URL"));
}
