//!
//! _Gateway configuration_
//!
//! Credentials and endpoints are read from the process environment once
//! at startup and carried in an explicit struct; nothing downstream
//! touches the environment again.
//!

use std::env;

use crate::batch::DEFAULT_THRESHOLD;
use crate::error::Error;

/// Environment variable holding the API key (required)
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding an optional proxy url
pub const PROXY_VAR: &str = "OPENAI_PROXY";
/// Environment variable overriding the API base url
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Settings for the chat-completion gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bearer token for the completion API
    pub api_key: String,
    /// Base url of the completion API, without trailing slash
    pub api_base: String,
    /// Optional proxy url for the HTTP agent
    pub proxy: Option<String>,
    /// Model identifier sent with every request
    pub model: String,
    /// Aggregate character size at which a batch is flushed
    pub batch_threshold: usize,
}

impl Config {
    /// Builds the config from the process environment.
    ///
    /// A missing or empty `OPENAI_API_KEY` is a startup fatal error.
    pub fn from_env<S: Into<String>>(model: S) -> Result<Self, Error> {
        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingApiKey(API_KEY_VAR))?;

        let api_base = env::var(API_BASE_VAR)
            .ok()
            .filter(|base| !base.is_empty())
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let proxy = env::var(PROXY_VAR).ok().filter(|url| !url.is_empty());

        Ok(Config {
            api_key,
            api_base,
            proxy,
            model: model.into(),
            batch_threshold: DEFAULT_THRESHOLD,
        })
    }

    /// Config with the given key and model and all defaults otherwise.
    pub fn new<K: Into<String>, M: Into<String>>(api_key: K, model: M) -> Self {
        Config {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            proxy: None,
            model: model.into(),
            batch_threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Override the API base url.
    pub fn api_base<S: Into<String>>(mut self, base: S) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Route requests through a proxy.
    pub fn proxy<S: Into<String>>(mut self, url: S) -> Self {
        self.proxy = Some(url.into());
        self
    }

    /// Override the batch flush threshold.
    pub fn batch_threshold(mut self, threshold: usize) -> Self {
        self.batch_threshold = threshold;
        self
    }
}

#[test]
fn builder_overrides_defaults() {
    let cfg = Config::new("sk-test", "gpt-3.5-turbo")
        .api_base("https://example.invalid/v1/")
        .proxy("http://127.0.0.1:8080")
        .batch_threshold(500);

    assert_eq!(cfg.api_base, "https://example.invalid/v1");
    assert_eq!(cfg.proxy.as_deref(), Some("http://127.0.0.1:8080"));
    assert_eq!(cfg.batch_threshold, 500);
    assert_eq!(cfg.model, "gpt-3.5-turbo");
}
