//! Spotify client implementation

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use museboxd_shared_config::SpotifyConfig;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::error::{SpotifyError, SpotifyResult};
use crate::models::{ApiErrorBody, ApiErrorDetail, TokenResponse};

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default number of retry attempts for transient failures
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds)
const RETRY_BASE_DELAY_MS: u64 = 100;

/// App tokens are treated as expired this long before Spotify says so
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// Spotify caps `artists?ids=` at 50 and `audio-features?ids=` at 100
const MAX_ARTIST_IDS: usize = 50;
const MAX_AUDIO_FEATURE_IDS: usize = 100;

/// Maximum error body length kept in error messages
const MAX_ERROR_BODY_LENGTH: usize = 1000;

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Parameters for `search`
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    /// Comma separated item types, e.g. `artist,album,track,playlist`
    pub types: String,
    pub limit: u32,
    pub offset: u32,
}

impl SearchParams {
    pub fn new(query: impl Into<String>, types: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            types: types.into(),
            limit: 20,
            offset: 0,
        }
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}

/// Spotify accounts service and Web API client
#[derive(Clone)]
pub struct SpotifyClient {
    http_client: Client,
    config: SpotifyConfig,
    app_token: Arc<RwLock<Option<CachedToken>>>,
    max_retries: u32,
}

impl fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("config", &self.config)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl SpotifyClient {
    /// Create a new client from configuration
    ///
    /// Missing credentials are not an error here; token requests fail with
    /// [`SpotifyError::MissingCredentials`] instead.
    pub fn new(config: SpotifyConfig) -> SpotifyResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent("Museboxd/1.0")
            .build()?;

        Ok(Self {
            http_client,
            config,
            app_token: Arc::new(RwLock::new(None)),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Override the number of retries for transient failures
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    /// Execute an operation with retry logic for transient failures
    async fn with_retry<T, F, Fut>(&self, operation: F) -> SpotifyResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = SpotifyResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay_ms = RETRY_BASE_DELAY_MS * 2u64.pow(attempt);
                    warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Spotify request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn map_send_error(e: reqwest::Error) -> SpotifyError {
        if e.is_timeout() {
            SpotifyError::Timeout
        } else {
            SpotifyError::Http(e)
        }
    }

    /// Read the body, turning non-success statuses into `SpotifyError::Api`
    async fn read_body(response: Response) -> SpotifyResult<String> {
        let status = response.status();
        let text = response.text().await.map_err(Self::map_send_error)?;
        if !status.is_success() {
            return Err(parse_api_error(status.as_u16(), &text));
        }
        Ok(text)
    }

    /// GET a Web API path with a bearer token
    async fn get<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> SpotifyResult<T> {
        let url = self.config.api_endpoint(path);
        debug!(url = %url, "Spotify GET");

        let text = self
            .with_retry(|| async {
                let response = self
                    .http_client
                    .get(&url)
                    .bearer_auth(token)
                    .query(query)
                    .send()
                    .await
                    .map_err(Self::map_send_error)?;
                Self::read_body(response).await
            })
            .await?;

        Ok(serde_json::from_str(&text)?)
    }

    /// POST a form to the accounts token endpoint with Basic client auth
    async fn request_token(&self, form: &[(&str, &str)]) -> SpotifyResult<TokenResponse> {
        if !self.config.has_credentials() {
            return Err(SpotifyError::MissingCredentials);
        }

        let credentials = BASE64.encode(format!(
            "{}:{}",
            self.config.client_id, self.config.client_secret
        ));
        let url = self.config.token_url();

        let text = self
            .with_retry(|| async {
                let response = self
                    .http_client
                    .post(&url)
                    .header(reqwest::header::AUTHORIZATION, format!("Basic {}", credentials))
                    .form(form)
                    .send()
                    .await
                    .map_err(Self::map_send_error)?;
                Self::read_body(response).await
            })
            .await?;

        Ok(serde_json::from_str(&text)?)
    }

    /// Client-credentials access token, served from cache while valid
    pub async fn app_token(&self) -> SpotifyResult<String> {
        {
            let guard = self.app_token.read().await;
            if let Some(ref cached) = *guard {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let token = self
            .request_token(&[("grant_type", "client_credentials")])
            .await?;
        let expires_at = Instant::now()
            + Duration::from_secs(token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS));

        let mut guard = self.app_token.write().await;
        *guard = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });
        debug!(expires_in = token.expires_in, "Fetched Spotify app token");

        Ok(token.access_token)
    }

    /// Exchange a user refresh token for a new access token
    #[instrument(skip_all)]
    pub async fn refresh_user_token(&self, refresh_token: &str) -> SpotifyResult<TokenResponse> {
        if refresh_token.trim().is_empty() {
            return Err(SpotifyError::InvalidInput(
                "refresh token cannot be empty".to_string(),
            ));
        }
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    /// Profile of the token's owner
    #[instrument(skip_all)]
    pub async fn current_user<T: DeserializeOwned>(&self, token: &str) -> SpotifyResult<T> {
        self.get(token, "me", &[]).await
    }

    #[instrument(skip(self, token))]
    pub async fn album<T: DeserializeOwned>(&self, token: &str, id: &str) -> SpotifyResult<T> {
        let id = validate_id(id)?;
        self.get(token, &format!("albums/{}", id), &[]).await
    }

    #[instrument(skip(self, token))]
    pub async fn artist_top_tracks<T: DeserializeOwned>(
        &self,
        token: &str,
        id: &str,
        market: &str,
    ) -> SpotifyResult<T> {
        let id = validate_id(id)?;
        self.get(
            token,
            &format!("artists/{}/top-tracks", id),
            &[("market", market.to_string())],
        )
        .await
    }

    /// Several artists by id; at most the first 50 ids are sent
    #[instrument(skip(self, token, ids), fields(count = ids.len()))]
    pub async fn artists<T: DeserializeOwned>(
        &self,
        token: &str,
        ids: &[String],
    ) -> SpotifyResult<T> {
        if ids.is_empty() {
            return Err(SpotifyError::InvalidInput(
                "at least one artist id is required".to_string(),
            ));
        }
        let ids = ids
            .iter()
            .take(MAX_ARTIST_IDS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        self.get(token, "artists", &[("ids", ids)]).await
    }

    #[instrument(skip_all)]
    pub async fn available_genre_seeds<T: DeserializeOwned>(
        &self,
        token: &str,
    ) -> SpotifyResult<T> {
        self.get(token, "recommendations/available-genre-seeds", &[])
            .await
    }

    /// `recommendations` with caller-built seed parameters
    #[instrument(skip(self, token))]
    pub async fn recommendations<T: DeserializeOwned>(
        &self,
        token: &str,
        params: &[(&str, String)],
    ) -> SpotifyResult<T> {
        self.get(token, "recommendations", params).await
    }

    #[instrument(skip(self, token))]
    pub async fn search<T: DeserializeOwned>(
        &self,
        token: &str,
        params: &SearchParams,
    ) -> SpotifyResult<T> {
        if params.query.trim().is_empty() {
            return Err(SpotifyError::InvalidInput(
                "search query cannot be empty".to_string(),
            ));
        }
        self.get(
            token,
            "search",
            &[
                ("q", params.query.clone()),
                ("type", params.types.clone()),
                ("limit", params.limit.to_string()),
                ("offset", params.offset.to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self, token))]
    pub async fn new_releases<T: DeserializeOwned>(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> SpotifyResult<T> {
        self.get(
            token,
            "browse/new-releases",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    #[instrument(skip(self, token))]
    pub async fn recently_played<T: DeserializeOwned>(
        &self,
        token: &str,
        limit: u32,
    ) -> SpotifyResult<T> {
        self.get(
            token,
            "me/player/recently-played",
            &[("limit", limit.to_string())],
        )
        .await
    }

    /// The user's liked songs
    #[instrument(skip(self, token))]
    pub async fn saved_tracks<T: DeserializeOwned>(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> SpotifyResult<T> {
        self.get(
            token,
            "me/tracks",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    #[instrument(skip_all)]
    pub async fn my_playlists<T: DeserializeOwned>(&self, token: &str) -> SpotifyResult<T> {
        self.get(token, "me/playlists", &[]).await
    }

    #[instrument(skip(self, token))]
    pub async fn playlist<T: DeserializeOwned>(&self, token: &str, id: &str) -> SpotifyResult<T> {
        let id = validate_id(id)?;
        self.get(token, &format!("playlists/{}", id), &[]).await
    }

    #[instrument(skip(self, token))]
    pub async fn playlist_tracks<T: DeserializeOwned>(
        &self,
        token: &str,
        id: &str,
    ) -> SpotifyResult<T> {
        let id = validate_id(id)?;
        self.get(token, &format!("playlists/{}/tracks", id), &[])
            .await
    }

    /// Audio features for up to 100 track ids
    #[instrument(skip(self, token, ids), fields(count = ids.len()))]
    pub async fn audio_features<T: DeserializeOwned>(
        &self,
        token: &str,
        ids: &[String],
    ) -> SpotifyResult<T> {
        if ids.is_empty() {
            return Err(SpotifyError::InvalidInput(
                "at least one track id is required".to_string(),
            ));
        }
        let ids = ids
            .iter()
            .take(MAX_AUDIO_FEATURE_IDS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        self.get(token, "audio-features", &[("ids", ids)]).await
    }
}

/// Spotify ids are base62; anything else would alter the request path
fn validate_id(id: &str) -> SpotifyResult<&str> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SpotifyError::InvalidInput(format!(
            "invalid Spotify id: {:?}",
            truncate_error_body(id)
        )));
    }
    Ok(id)
}

/// Build an `Api` error from a non-success response body
fn parse_api_error(status: u16, body: &str) -> SpotifyError {
    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            error: ApiErrorDetail::Detailed { message },
            ..
        }) => message,
        Ok(ApiErrorBody {
            error: ApiErrorDetail::Code(code),
            error_description,
        }) => match error_description {
            Some(description) => format!("{}: {}", code, description),
            None => code,
        },
        Err(_) => truncate_error_body(body),
    };
    SpotifyError::Api { status, message }
}

/// Truncate an upstream body on a UTF-8 boundary
fn truncate_error_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}
