//! Session route handlers
//!
//! - `POST /auth/session` - Exchange a Spotify access token for a session
//! - `DELETE /auth/logout` - Invalidate the current session

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::middleware::{ApiJson, AuthUser};
use crate::models::user::{SessionToken, User};
use crate::services::AuthService;

/// Shared application state for auth handlers
#[derive(Clone)]
pub struct AuthState {
    pub auth_service: Arc<AuthService>,
}

impl AuthState {
    pub fn new(auth_service: AuthService) -> Self {
        Self {
            auth_service: Arc::new(auth_service),
        }
    }
}

/// Create authentication router
pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/session", post(create_session))
        .route("/logout", delete(logout))
        .with_state(state)
}

// ========== Request/Response Types ==========

/// Tokens obtained by the frontend's Spotify OAuth flow
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Spotify token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub session: SessionToken,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ========== Route Handlers ==========

/// Sign in with a Spotify access token
///
/// # Response
/// - 200 OK: user profile and session token
/// - 400 Bad Request: `access_token` missing
/// - Spotify's status (usually 401) if the token is rejected
async fn create_session(
    State(state): State<AuthState>,
    ApiJson(request): ApiJson<CreateSessionRequest>,
) -> ApiResult<impl IntoResponse> {
    let (user, session) = state
        .auth_service
        .create_session(
            request.access_token.as_deref().unwrap_or_default(),
            request.refresh_token.as_deref(),
            request.expires_in,
        )
        .await?;

    Ok(Json(SessionResponse { user, session }))
}

/// Invalidate the caller's session
async fn logout(State(state): State<AuthState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    state.auth_service.logout(auth.session_id).await?;
    Ok(Json(LogoutResponse { success: true }))
}
