//! Session service for Museboxd
//!
//! Users sign in with a Spotify access token obtained by the frontend's
//! OAuth flow. This service:
//! - verifies the provider token against Spotify `GET /me`
//! - upserts the user and stores the provider tokens encrypted
//! - issues and verifies HS256 session tokens
//! - refreshes expired provider tokens on authenticated requests

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use museboxd_spotify_client::{models::CurrentUser, SpotifyClient};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::user::{Claims, SessionToken, UpsertUser, User, TOKEN_AUDIENCE, TOKEN_ISSUER};
use crate::repositories::{NewSession, SessionRepository, UserRepository};
use crate::services::encryption::EncryptionService;

/// Default session lifetime (30 days)
const DEFAULT_SESSION_TTL_SECS: i64 = 30 * 24 * 3600;

/// Spotify access tokens live one hour unless told otherwise
const DEFAULT_PROVIDER_TOKEN_TTL_SECS: i64 = 3600;

/// Longest provider token lifetime accepted from a client
const MAX_PROVIDER_TOKEN_TTL_SECS: i64 = 24 * 3600;

/// Refresh provider tokens this long before they expire
const PROVIDER_REFRESH_MARGIN_SECS: i64 = 60;

/// Session service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Session token TTL in seconds
    pub session_ttl_secs: i64,
    /// JWT issuer
    pub issuer: String,
    /// JWT audience
    pub audience: String,
}

impl AuthConfig {
    /// Create a new AuthConfig with the default TTL
    pub fn new(jwt_secret: String) -> Self {
        Self {
            jwt_secret,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            issuer: TOKEN_ISSUER.to_string(),
            audience: TOKEN_AUDIENCE.to_string(),
        }
    }

    /// Create AuthConfig from an expiry string (e.g., "12h", "30d")
    pub fn with_expiry_string(jwt_secret: String, session_expiry: &str) -> Self {
        Self {
            session_ttl_secs: parse_duration_string(session_expiry)
                .unwrap_or(DEFAULT_SESSION_TTL_SECS),
            ..Self::new(jwt_secret)
        }
    }
}

/// Parse duration strings like "15m", "7d", "24h" to seconds
fn parse_duration_string(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (split, _) = s.char_indices().last()?;
    let (num_str, unit) = s.split_at(split);
    let num: i64 = num_str.parse().ok()?;

    let multiplier = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 24 * 3600,
        "w" => 7 * 24 * 3600,
        _ => return None,
    };
    num.checked_mul(multiplier)
}

/// Lifetime of a client-supplied provider token; 0..=24h, 1h when absent
fn provider_token_ttl(expires_in: Option<i64>) -> ApiResult<Duration> {
    let secs = expires_in.unwrap_or(DEFAULT_PROVIDER_TOKEN_TTL_SECS);
    if !(0..=MAX_PROVIDER_TOKEN_TTL_SECS).contains(&secs) {
        return Err(ApiError::ValidationError(format!(
            "expires_in must be between 0 and {} seconds",
            MAX_PROVIDER_TOKEN_TTL_SECS
        )));
    }
    Ok(Duration::seconds(secs))
}

/// Result of a successful request authentication
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub claims: Claims,
    /// Usable (decrypted, refreshed if needed) Spotify access token
    pub spotify_token: String,
}

/// Session service backed by Spotify identity
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    users: UserRepository,
    sessions: SessionRepository,
    spotify: SpotifyClient,
    encryption: EncryptionService,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(
        config: AuthConfig,
        users: UserRepository,
        sessions: SessionRepository,
        spotify: SpotifyClient,
        encryption: EncryptionService,
    ) -> Self {
        Self {
            config,
            users,
            sessions,
            spotify,
            encryption,
        }
    }

    /// Sign a user in with a Spotify access token
    ///
    /// # Arguments
    /// * `access_token` - Spotify user access token
    /// * `refresh_token` - Spotify refresh token, if the login flow provided one
    /// * `expires_in` - Provider token lifetime in seconds (default: 3600)
    ///
    /// # Returns
    /// The stored user profile and a new session token
    ///
    /// # Errors
    /// - `ApiError::MissingField` if `access_token` is empty
    /// - `ApiError::ValidationError` if `expires_in` is negative or over a day
    /// - `ApiError::Upstream` with Spotify's status if the token is rejected
    pub async fn create_session(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_in: Option<i64>,
    ) -> ApiResult<(User, SessionToken)> {
        if access_token.trim().is_empty() {
            return Err(ApiError::MissingField("access_token"));
        }
        let provider_ttl = provider_token_ttl(expires_in)?;

        let profile: CurrentUser = self
            .spotify
            .current_user(access_token)
            .await
            .map_err(|e| ApiError::spotify("verify Spotify token", e))?;

        let user = self
            .users
            .upsert(&UpsertUser {
                display_name: profile
                    .display_name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| profile.id.clone()),
                id: profile.id,
                email: profile.email,
                image_url: profile.images.into_iter().next().map(|image| image.url),
            })
            .await?;

        let session_id = Uuid::new_v4();
        let (jwt, expires_at) = self.issue_token(&user.id, session_id)?;

        let sealed_access = self.encrypt(access_token)?;
        let sealed_refresh = refresh_token
            .filter(|token| !token.is_empty())
            .map(|token| self.encrypt(token))
            .transpose()?;
        let token_hash = hash_token(&jwt);

        self.sessions
            .create(&NewSession {
                id: session_id,
                user_id: &user.id,
                token_hash: &token_hash,
                spotify_access_token: &sealed_access,
                spotify_refresh_token: sealed_refresh.as_deref(),
                spotify_token_expires_at: Utc::now() + provider_ttl,
                expires_at,
            })
            .await?;

        tracing::info!(user_id = %user.id, session_id = %session_id, "Session created");

        Ok((user, SessionToken::new(jwt, expires_at)))
    }

    /// Sign a session token for `user_id`
    pub fn issue_token(
        &self,
        user_id: &str,
        session_id: Uuid,
    ) -> ApiResult<(String, DateTime<Utc>)> {
        let claims = Claims {
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            ..Claims::new(user_id, session_id, self.config.session_ttl_secs)
        };
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| ApiError::Internal("session expiry out of range".to_string()))?;

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )?;

        Ok((token, expires_at))
    }

    /// Verify a session token's signature, expiry, issuer and audience
    pub fn verify_access_token(&self, token: &str) -> ApiResult<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Session token verification failed");
            ApiError::InvalidToken(e.to_string())
        })?;

        Ok(token_data.claims)
    }

    /// Resolve a bearer token to its session and a usable Spotify token
    ///
    /// # Errors
    /// - `ApiError::InvalidToken` for bad signatures, revoked sessions and
    ///   provider tokens that expired without a way to refresh them
    /// - `ApiError::Database` if the session lookup fails
    pub async fn authenticate(&self, token: &str) -> ApiResult<AuthenticatedSession> {
        let claims = self.verify_access_token(token)?;

        let session = self
            .sessions
            .find_active(claims.sid, &claims.sub, &hash_token(token))
            .await?
            .ok_or_else(|| ApiError::InvalidToken("session is no longer active".to_string()))?;

        let access_token = self.decrypt(&session.spotify_access_token)?;

        let now = Utc::now();
        if session.spotify_token_expires_at > now + Duration::seconds(PROVIDER_REFRESH_MARGIN_SECS)
        {
            return Ok(AuthenticatedSession {
                claims,
                spotify_token: access_token,
            });
        }

        let Some(sealed_refresh) = session.spotify_refresh_token.as_deref() else {
            if session.spotify_token_expires_at > now {
                return Ok(AuthenticatedSession {
                    claims,
                    spotify_token: access_token,
                });
            }
            return Err(ApiError::InvalidToken(
                "Spotify session expired".to_string(),
            ));
        };

        let refresh_token = self.decrypt(sealed_refresh)?;
        let refreshed = self
            .spotify
            .refresh_user_token(&refresh_token)
            .await
            .map_err(|e| {
                tracing::warn!(session_id = %session.id, error = %e, "Spotify token refresh failed");
                ApiError::InvalidToken("Spotify session expired".to_string())
            })?;

        let sealed_access = self.encrypt(&refreshed.access_token)?;
        let sealed_rotated = refreshed
            .refresh_token
            .as_deref()
            .map(|token| self.encrypt(token))
            .transpose()?;
        let expires_in = i64::try_from(refreshed.expires_in)
            .unwrap_or(DEFAULT_PROVIDER_TOKEN_TTL_SECS)
            .min(MAX_PROVIDER_TOKEN_TTL_SECS);

        self.sessions
            .update_spotify_token(
                session.id,
                &sealed_access,
                sealed_rotated.as_deref(),
                now + Duration::seconds(expires_in),
            )
            .await?;

        tracing::debug!(session_id = %session.id, "Refreshed Spotify access token");

        Ok(AuthenticatedSession {
            claims,
            spotify_token: refreshed.access_token,
        })
    }

    /// Deactivate a session
    pub async fn logout(&self, session_id: Uuid) -> ApiResult<()> {
        let found = self.sessions.deactivate(session_id).await?;
        if !found {
            return Err(ApiError::InvalidToken("session not found".to_string()));
        }

        tracing::info!(session_id = %session_id, "Session deactivated");
        Ok(())
    }

    fn encrypt(&self, token: &str) -> ApiResult<Vec<u8>> {
        self.encryption
            .encrypt(token)
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn decrypt(&self, sealed: &[u8]) -> ApiResult<String> {
        self.encryption.decrypt(sealed).map_err(|e| {
            tracing::warn!(error = %e, "Stored Spotify token could not be decrypted");
            ApiError::InvalidToken("stored Spotify token is unreadable".to_string())
        })
    }
}

/// Hash a token using SHA-256
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
