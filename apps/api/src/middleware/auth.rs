//! Authentication extractor for Axum handlers
//!
//! `AuthUser` resolves `Authorization: Bearer <session token>` to the
//! session it names and a usable Spotify access token. The `AuthService`
//! must be installed as a request extension.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::middleware::AuthUser;
//!
//! async fn recently_played(auth: AuthUser) -> impl IntoResponse {
//!     format!("Spotify user {}", auth.user_id)
//! }
//! ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::error::{ApiError, ErrorResponse};
use crate::models::user::Claims;
use crate::services::AuthService;

/// Authenticated user extractor - requires a valid, active session
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Spotify user id
    pub user_id: String,
    /// Session ID from the token
    pub session_id: Uuid,
    /// JWT claims from the session token
    pub claims: Claims,
    /// Spotify access token for user-scoped calls
    pub spotify_token: String,
}

/// Authentication rejection types
#[derive(Debug)]
pub enum AuthRejection {
    /// Missing or invalid Authorization header
    MissingToken,
    /// Token is malformed, expired or its session is gone
    InvalidToken(String),
    /// Database error while loading the session
    DatabaseError(String),
    /// AuthService not installed
    MissingServices,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AuthRejection::MissingToken => {
                tracing::debug!("Authentication rejected: missing token");
                (StatusCode::UNAUTHORIZED, ApiError::Unauthorized)
            }
            AuthRejection::InvalidToken(reason) => {
                tracing::debug!(reason = %reason, "Authentication rejected: invalid token");
                (StatusCode::UNAUTHORIZED, ApiError::InvalidToken(reason))
            }
            AuthRejection::DatabaseError(e) => {
                tracing::error!(error = %e, "Authentication rejected: database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::Internal(format!("Failed to load session: {}", e)),
                )
            }
            AuthRejection::MissingServices => {
                tracing::error!("Authentication rejected: missing services in request extensions");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::Internal("Authentication services not configured".to_string()),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: error.error_code(),
            message: error.to_string(),
            details: None,
        });

        (status, body).into_response()
    }
}

impl From<ApiError> for AuthRejection {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Database(e) => Self::DatabaseError(e.to_string()),
            ApiError::InvalidToken(reason) => Self::InvalidToken(reason),
            other => Self::InvalidToken(other.to_string()),
        }
    }
}

/// Extract the bearer token from the Authorization header (case-insensitive scheme)
fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;

    let mut segments = value.split_whitespace();
    let scheme = segments.next()?;
    let token = segments.next()?;

    // Reject malformed values like "Bearer <token> <extra>"
    if segments.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts).ok_or(AuthRejection::MissingToken)?;

        let auth_service = parts
            .extensions
            .get::<AuthService>()
            .ok_or(AuthRejection::MissingServices)?;

        let session = auth_service.authenticate(token).await?;

        Ok(AuthUser {
            user_id: session.claims.sub.clone(),
            session_id: session.claims.sid,
            claims: session.claims,
            spotify_token: session.spotify_token,
        })
    }
}
