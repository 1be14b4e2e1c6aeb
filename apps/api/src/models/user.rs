//! User, session and token models
//!
//! Users are keyed by their Spotify id. A session row maps one Museboxd
//! session token to the encrypted Spotify tokens it was created with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// JWT issuer and audience for session tokens
pub const TOKEN_ISSUER: &str = "museboxd";
pub const TOKEN_AUDIENCE: &str = "museboxd";

/// User account from the users table
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Spotify user id
    pub id: String,

    pub display_name: String,

    pub email: Option<String>,

    /// First Spotify profile image
    pub image_url: Option<String>,

    /// Last session creation or recently-played fetch
    pub last_activity_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Profile fields written on every session creation
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

/// Session record from the sessions table
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,

    pub user_id: String,

    /// Encrypted Spotify access token
    pub spotify_access_token: Vec<u8>,

    /// Encrypted Spotify refresh token, when the login flow provided one
    pub spotify_refresh_token: Option<Vec<u8>>,

    pub spotify_token_expires_at: DateTime<Utc>,

    pub is_active: bool,

    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    pub last_active_at: DateTime<Utc>,
}

/// JWT claims payload of a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (Spotify user id)
    pub sub: String,

    /// Session ID
    pub sid: Uuid,

    /// Issued at (Unix epoch)
    pub iat: i64,

    /// Expiration (Unix epoch)
    pub exp: i64,

    pub iss: String,

    pub aud: String,
}

impl Claims {
    /// Claims for a new session
    pub fn new(user_id: &str, session_id: Uuid, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            sid: session_id,
            iat: now,
            exp: now.saturating_add(ttl_secs),
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
        }
    }
}

/// Session token returned after sign-in
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    pub access_token: String,

    pub expires_at: DateTime<Utc>,

    /// Always "Bearer"
    pub token_type: &'static str,
}

impl SessionToken {
    pub fn new(access_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            expires_at,
            token_type: "Bearer",
        }
    }
}
