//! Runtime configuration, read from environment-style key/value lookups.

use geoagent_core::session::HistoryMode;
use geoagent_llm::backends::openai::DEFAULT_MODEL;
use std::str::FromStr;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const MCP_URL_VAR: &str = "GIS_MCP_URL";
pub const HISTORY_VAR: &str = "GEOAGENT_HISTORY";
pub const MAX_TURNS_VAR: &str = "GEOAGENT_MAX_TURNS";
pub const TIMEOUT_VAR: &str = "GEOAGENT_TIMEOUT_SECONDS";

pub const DEFAULT_MCP_URL: &str = "http://localhost:8080/mcp";
pub const DEFAULT_MAX_TURNS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set. Export your API key and try again.")]
    MissingApiKey,

    #[error("Invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    /// `None` keeps the backend's default endpoint
    pub base_url: Option<String>,
    pub model: String,
    pub mcp_url: String,
    pub history_mode: HistoryMode,
    pub max_turns: usize,
    pub timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("mcp_url", &self.mcp_url)
            .field("history_mode", &self.history_mode)
            .field("max_turns", &self.max_turns)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key/value source.
    ///
    /// Blank values count as unset. The API key is checked before anything
    /// else is read.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            api_key,
            base_url: get(BASE_URL_VAR),
            model: get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            mcp_url: get(MCP_URL_VAR).unwrap_or_else(|| DEFAULT_MCP_URL.to_string()),
            history_mode: parse_var(HISTORY_VAR, get(HISTORY_VAR))?.unwrap_or_default(),
            max_turns: match parse_var::<usize>(MAX_TURNS_VAR, get(MAX_TURNS_VAR))? {
                Some(0) => {
                    return Err(ConfigError::Invalid {
                        name: MAX_TURNS_VAR,
                        message: "must be at least 1".to_string(),
                    })
                }
                Some(n) => n,
                None => DEFAULT_MAX_TURNS,
            },
            timeout_seconds: parse_var(TIMEOUT_VAR, get(TIMEOUT_VAR))?,
        })
    }
}

fn parse_var<T>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|v| {
        v.parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            message: format!("'{v}': {e}"),
        })
    })
    .transpose()
}
