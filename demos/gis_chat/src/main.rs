use clap::Parser;
use colored::*;
use geoagent::config::{
    Config, ConfigError, BASE_URL_VAR, HISTORY_VAR, MAX_TURNS_VAR, MCP_URL_VAR, MODEL_VAR,
    TIMEOUT_VAR,
};
use geoagent::startup::{self, Started, StartupError};
use std::process::ExitCode;
use tokio::sync::mpsc;

mod interactive;

/// Chat with a GIS assistant whose tools live on a remote MCP server
///
/// Every flag falls back to its environment variable. Values are validated
/// together with the environment, so a bad flag aborts startup the same way
/// a bad variable does.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long, help = "model to chat with [env: OPENAI_MODEL]")]
    model: Option<String>,

    #[arg(long, help = "OpenAI-compatible endpoint [env: OPENAI_BASE_URL]")]
    base_url: Option<String>,

    #[arg(long, help = "MCP server URL, streamable HTTP [env: GIS_MCP_URL]")]
    mcp_url: Option<String>,

    #[arg(
        long,
        help = "single-turn or multi-turn [env: GEOAGENT_HISTORY]"
    )]
    history: Option<String>,

    #[arg(
        long,
        help = "model/tool rounds allowed per question [env: GEOAGENT_MAX_TURNS]"
    )]
    max_turns: Option<String>,

    #[arg(long, help = "model request timeout [env: GEOAGENT_TIMEOUT_SECONDS]")]
    timeout_seconds: Option<String>,

    #[arg(long, help = "print tool calls as they happen")]
    show_tool_calls: bool,
}

impl Args {
    fn flag(&self, key: &str) -> Option<&String> {
        match key {
            MODEL_VAR => self.model.as_ref(),
            BASE_URL_VAR => self.base_url.as_ref(),
            MCP_URL_VAR => self.mcp_url.as_ref(),
            HISTORY_VAR => self.history.as_ref(),
            MAX_TURNS_VAR => self.max_turns.as_ref(),
            TIMEOUT_VAR => self.timeout_seconds.as_ref(),
            _ => None,
        }
    }

    /// Command-line values first, then `env`.
    fn config<E>(&self, env: E) -> Result<Config, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        Config::from_lookup(|key| self.flag(key).cloned().or_else(|| env(key)))
    }
}

async fn connect(args: &Args) -> Result<Started, StartupError> {
    let config = args.config(|key| std::env::var(key).ok())?;

    let events = args.show_tool_calls.then(|| {
        let (tx, rx) = mpsc::channel(100);
        interactive::handle_events(rx);
        tx
    });

    println!("Connecting to GIS tools at {} ...", config.mcp_url);
    startup::start(config, events).await
}

#[tokio::main]
async fn main() -> ExitCode {
    geoagent::init_logging();
    let args = Args::parse();

    let started = match interactive::until_interrupted(connect(&args), interactive::interrupted())
        .await
    {
        Some(Ok(started)) => started,
        Some(Err(e)) => {
            eprintln!("{} {e}", "Startup failed:".red().bold());
            return ExitCode::FAILURE;
        }
        None => {
            println!("\nInterrupted. Goodbye!");
            return ExitCode::SUCCESS;
        }
    };

    match interactive::run_interactive_session(started).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "Session failed:".red().bold());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoagent::config::API_KEY_VAR;
    use geoagent::core::session::HistoryMode;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_values_go_through_config_parsing() {
        let args = Args::try_parse_from(["gis_chat"]).unwrap();
        let config = args
            .config(env(&[
                (API_KEY_VAR, "sk-test"),
                (MAX_TURNS_VAR, " 5 "),
                (HISTORY_VAR, "multi-turn"),
            ]))
            .unwrap();

        assert_eq!(config.max_turns, 5);
        assert_eq!(config.history_mode, HistoryMode::MultiTurn);
    }

    #[test]
    fn test_bad_env_values_are_config_errors() {
        let args = Args::try_parse_from(["gis_chat"]).unwrap();

        let err = args
            .config(env(&[(API_KEY_VAR, "sk-test"), (MAX_TURNS_VAR, "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: MAX_TURNS_VAR, .. }));

        let err = args
            .config(env(&[(API_KEY_VAR, "sk-test"), (HISTORY_VAR, "forever")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: HISTORY_VAR, .. }));
    }

    #[test]
    fn test_flags_override_env() {
        let args = Args::try_parse_from([
            "gis_chat",
            "--max-turns",
            "2",
            "--mcp-url",
            "http://gis.local:9000/mcp",
        ])
        .unwrap();
        let config = args
            .config(env(&[
                (API_KEY_VAR, "sk-test"),
                (MAX_TURNS_VAR, "7"),
                (MCP_URL_VAR, "http://elsewhere/mcp"),
                (MODEL_VAR, "gpt-4o"),
            ]))
            .unwrap();

        assert_eq!(config.max_turns, 2);
        assert_eq!(config.mcp_url, "http://gis.local:9000/mcp");
        assert_eq!(config.model, "gpt-4o");
    }

    #[test]
    fn test_bad_flag_is_a_config_error_not_a_usage_error() {
        let args = Args::try_parse_from(["gis_chat", "--max-turns", "0"]).unwrap();
        let err = args.config(env(&[(API_KEY_VAR, "sk-test")])).unwrap_err();
        assert!(err.to_string().contains(MAX_TURNS_VAR));
    }

    #[test]
    fn test_missing_key_with_flags() {
        let args = Args::try_parse_from(["gis_chat", "--model", "gpt-4o"]).unwrap();
        let err = args.config(env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }
}
