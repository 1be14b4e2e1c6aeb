//! Error types for the Gemini client

use thiserror::Error;

/// Errors that can occur when calling Gemini
#[derive(Error, Debug)]
pub enum GeminiError {
    /// No API key configured
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize/deserialize JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Gemini returned a non-success status
    #[error("Gemini API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Request timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Response had no usable text
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Could not connect to the API host
    #[error("Connection refused by {0}")]
    ConnectionRefused(String),

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts failed. Last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl GeminiError {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        match self {
            GeminiError::Timeout(_)
            | GeminiError::ConnectionRefused(_)
            | GeminiError::HttpError(_) => true,
            GeminiError::ApiError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type for Gemini operations
pub type GeminiResult<T> = Result<T, GeminiError>;
