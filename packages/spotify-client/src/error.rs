//! Spotify client error types

use thiserror::Error;

/// Spotify client errors
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Client id or secret not configured
    #[error("Missing Spotify credentials")]
    MissingCredentials,

    /// Invalid input provided to a client method
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("Failed to parse Spotify response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Spotify answered with a non-success status
    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Request timeout
    #[error("Request to Spotify timed out")]
    Timeout,
}

impl SpotifyError {
    /// Check if this error is retryable (transient failure)
    ///
    /// Retries on timeouts, connection failures, rate limiting (429)
    /// and server errors (5xx). Other 4xx answers are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            SpotifyError::Timeout => true,
            SpotifyError::Http(e) => e.is_timeout() || e.is_connect(),
            SpotifyError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Upstream HTTP status, if Spotify produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            SpotifyError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for Spotify operations
pub type SpotifyResult<T> = Result<T, SpotifyError>;
