//! Gemini HTTP client with retry logic and connection pooling

use std::future::Future;
use std::time::Duration;

use museboxd_shared_config::GeminiConfig;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::error::{GeminiError, GeminiResult};
use crate::models::{
    Content, ErrorBody, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

/// Header carrying the API key, so it never appears in request URLs
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Maximum error body size kept in error messages
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// Default retry configuration
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    /// HTTP client with connection pool
    http_client: Client,
    config: GeminiConfig,
    /// Number of attempts for transient failures
    retry_attempts: u32,
    /// Base delay for exponential backoff (milliseconds)
    retry_base_delay_ms: u64,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .field("retry_attempts", &self.retry_attempts)
            .finish()
    }
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &GeminiConfig) -> GeminiResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(GeminiError::HttpError)?;

        Ok(Self {
            http_client,
            config: config.clone(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        })
    }

    /// Set retry configuration
    pub fn with_retry_config(mut self, attempts: u32, base_delay_ms: u64) -> Self {
        self.retry_attempts = attempts;
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Execute an async operation with retry logic
    async fn with_retry<T, F, Fut>(&self, operation: F) -> GeminiResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = GeminiResult<T>>,
    {
        if self.retry_attempts <= 1 {
            return operation().await;
        }

        let mut last_error = None;

        for attempt in 0..self.retry_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempt < self.retry_attempts - 1 {
                        let delay = self.retry_base_delay_ms * 2_u64.pow(attempt);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = self.retry_attempts,
                            delay_ms = delay,
                            error = %e,
                            "Retrying Gemini request after transient error"
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(GeminiError::RetriesExhausted {
            attempts: self.retry_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
        })
    }

    /// Truncate error body on a UTF-8 boundary
    fn truncate_error_body(body: String) -> String {
        if body.len() <= MAX_ERROR_BODY_SIZE {
            return body;
        }

        let truncate_at = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_ERROR_BODY_SIZE)
            .last()
            .unwrap_or(0);

        format!("{}... (truncated)", &body[..truncate_at])
    }

    fn map_send_error(&self, e: reqwest::Error) -> GeminiError {
        if e.is_connect() {
            GeminiError::ConnectionRefused(self.config.url.clone())
        } else if e.is_timeout() {
            GeminiError::Timeout(self.config.timeout_secs)
        } else {
            GeminiError::HttpError(e.without_url())
        }
    }

    async fn api_error(response: reqwest::Response) -> GeminiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
            _ => Self::truncate_error_body(body),
        };
        GeminiError::ApiError { status, message }
    }

    fn require_api_key(&self) -> GeminiResult<&str> {
        if !self.config.is_configured() {
            return Err(GeminiError::MissingApiKey);
        }
        Ok(self.config.api_key.as_str())
    }

    /// Check that the API key is accepted and the model exists
    pub async fn health_check(&self) -> GeminiResult<bool> {
        let api_key = self.require_api_key()?;
        let response = self
            .http_client
            .get(self.config.model_url())
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Ok(response.status().is_success())
    }

    /// Single `generateContent` request, no retry
    async fn generate_internal(&self, request: &GenerateContentRequest) -> GeminiResult<String> {
        let api_key = self.require_api_key()?;

        let response = self
            .http_client
            .post(self.config.generate_url())
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::HttpError(e.without_url()))?;
        body.text().ok_or_else(|| {
            let reason = body
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            GeminiError::InvalidResponse(format!("empty completion ({})", reason))
        })
    }

    /// Generate text from a prompt using the configured sampling options
    pub async fn generate(&self, prompt: &str) -> GeminiResult<String> {
        self.generate_with_options(
            prompt,
            GenerationConfig {
                temperature: Some(self.config.temperature),
                max_output_tokens: Some(self.config.max_tokens),
                top_p: None,
            },
        )
        .await
    }

    /// Generate text with explicit sampling options and retry logic
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()))]
    pub async fn generate_with_options(
        &self,
        prompt: &str,
        options: GenerationConfig,
    ) -> GeminiResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: Some(options),
        };

        let text = self.with_retry(|| self.generate_internal(&request)).await?;
        debug!(response_len = text.len(), "Gemini generation complete");
        Ok(text)
    }
}
