//! Gemini generative AI configuration types

use crate::{get_env_or_default, parse_env, ConfigResult};

const DEFAULT_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini API configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API base URL
    pub url: String,

    /// API key, sent as the `key` query parameter
    pub api_key: String,

    /// Model used for text generation
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum output tokens for generation
    pub max_tokens: u32,

    /// Temperature for generation (0.0 - 2.0)
    pub temperature: f32,
}

impl GeminiConfig {
    /// Load Gemini configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            url: get_env_or_default("GEMINI_API_URL", DEFAULT_URL),
            api_key: get_env_or_default("GEMINI_API_KEY", ""),
            model: get_env_or_default("GEMINI_MODEL", "gemini-1.5-flash"),
            timeout_secs: parse_env("GEMINI_TIMEOUT", 60)?,
            max_tokens: parse_env("GEMINI_MAX_TOKENS", 1000)?,
            temperature: parse_env("GEMINI_TEMPERATURE", 0.7)?,
        })
    }

    /// Create a configuration with a custom URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Whether an API key is present
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Full URL of the model metadata endpoint
    pub fn model_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}",
            self.url.trim_end_matches('/'),
            self.model
        )
    }

    /// Full URL of the `generateContent` endpoint
    pub fn generate_url(&self) -> String {
        format!("{}:generateContent", self.model_url())
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 60,
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}
