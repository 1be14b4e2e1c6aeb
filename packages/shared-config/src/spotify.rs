//! Spotify Web API configuration types

use crate::{get_env_or_default, parse_env, ConfigResult};

const DEFAULT_API_URL: &str = "https://api.spotify.com";
const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Spotify Web API and accounts service configuration
///
/// Credentials may be empty in development. Routes that need an app token
/// report the missing credentials at request time instead of refusing to
/// start.
#[derive(Clone)]
pub struct SpotifyConfig {
    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Web API base URL (without the `/v1` prefix)
    pub api_url: String,

    /// Accounts service base URL (token endpoint host)
    pub accounts_url: String,

    /// Market used when a route does not specify one
    pub default_market: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SpotifyConfig {
    /// Load Spotify configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            client_id: get_env_or_default("SPOTIFY_CLIENT_ID", ""),
            client_secret: get_env_or_default("SPOTIFY_CLIENT_SECRET", ""),
            api_url: get_env_or_default("SPOTIFY_API_URL", DEFAULT_API_URL),
            accounts_url: get_env_or_default("SPOTIFY_ACCOUNTS_URL", DEFAULT_ACCOUNTS_URL),
            default_market: get_env_or_default("SPOTIFY_DEFAULT_MARKET", "US"),
            timeout_secs: parse_env("SPOTIFY_TIMEOUT", 30)?,
        })
    }

    /// Create a configuration with credentials and default endpoints
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Point both the Web API and the accounts service at one base URL (for mock servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_url = url.clone();
        self.accounts_url = url;
        self
    }

    /// Whether both client credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    /// Full URL for a Web API path, e.g. `albums/{id}`
    pub fn api_endpoint(&self, path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Full URL of the OAuth token endpoint
    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_url.trim_end_matches('/'))
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            default_market: "US".to_string(),
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("accounts_url", &self.accounts_url)
            .field("default_market", &self.default_market)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
