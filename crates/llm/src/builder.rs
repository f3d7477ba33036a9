//! Builder for configuring and instantiating LLM providers.
//!
//! Each backend implements `build()` on its own `LLMBuilder<Backend>`, so the
//! builder stays one type while validation rules stay per backend.

use crate::LLMProvider;
use std::marker::PhantomData;

/// Builder for configuring and instantiating LLM providers.
pub struct LLMBuilder<L: LLMProvider> {
    /// Selected backend provider
    pub(crate) backend: PhantomData<L>,
    /// API key for authentication with the provider
    pub(crate) api_key: Option<String>,
    /// Base URL for API requests (proxies, OpenRouter, self-hosted servers)
    pub(crate) base_url: Option<String>,
    /// Model identifier/name to use
    pub(crate) model: Option<String>,
    /// Maximum tokens to generate in responses
    pub(crate) max_tokens: Option<u32>,
    /// Sampling temperature
    pub(crate) temperature: Option<f32>,
    /// Request timeout duration in seconds
    pub(crate) timeout_seconds: Option<u64>,
    /// Preconfigured HTTP client; `timeout_seconds` is ignored when set
    pub(crate) client: Option<reqwest::Client>,
}

impl<L: LLMProvider> Default for LLMBuilder<L> {
    fn default() -> Self {
        Self {
            backend: PhantomData,
            api_key: None,
            base_url: None,
            model: None,
            max_tokens: None,
            temperature: None,
            timeout_seconds: None,
            client: None,
        }
    }
}

impl<L: LLMProvider> LLMBuilder<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }
}
