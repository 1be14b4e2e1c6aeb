//! Session repository
//!
//! All session-related queries live here so the auth service and the
//! request extractor share one definition of "active session".

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::utils::SESSION_COLUMNS;
use crate::models::user::Session;

/// Values for a new session row
#[derive(Debug)]
pub struct NewSession<'a> {
    pub id: Uuid,
    pub user_id: &'a str,
    /// SHA-256 of the issued session token
    pub token_hash: &'a str,
    pub spotify_access_token: &'a [u8],
    pub spotify_refresh_token: Option<&'a [u8]>,
    pub spotify_token_expires_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Repository for session database operations
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new SessionRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new session
    pub async fn create(&self, session: &NewSession<'_>) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, user_id, token_hash,
                spotify_access_token, spotify_refresh_token, spotify_token_expires_at,
                expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.token_hash)
        .bind(session.spotify_access_token)
        .bind(session.spotify_refresh_token)
        .bind(session.spotify_token_expires_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find an unexpired, active session belonging to `user_id` that was
    /// issued for the token hashing to `token_hash`
    ///
    /// Also bumps `last_active_at`, so a hit doubles as a heartbeat.
    pub async fn find_active(
        &self,
        session_id: Uuid,
        user_id: &str,
        token_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE sessions
            SET last_active_at = NOW()
            WHERE id = $1
              AND user_id = $2
              AND token_hash = $3
              AND is_active = true
              AND expires_at > NOW()
            RETURNING {}
            "#,
            SESSION_COLUMNS
        );

        sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .bind(user_id)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
    }

    /// Store a refreshed Spotify token
    ///
    /// `refresh_token` is only replaced when Spotify rotated it.
    pub async fn update_spotify_token(
        &self,
        session_id: Uuid,
        access_token: &[u8],
        refresh_token: Option<&[u8]>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE sessions
            SET spotify_access_token = $1,
                spotify_refresh_token = COALESCE($2, spotify_refresh_token),
                spotify_token_expires_at = $3
            WHERE id = $4
            "#,
        )
        .bind(access_token)
        .bind(refresh_token)
        .bind(expires_at)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deactivate a single session (logout)
    ///
    /// Returns `false` if no session with that id exists.
    pub async fn deactivate(&self, session_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE sessions SET is_active = false WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete up to `batch_size` expired sessions
    pub async fn delete_expired(&self, batch_size: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id IN (
                SELECT id FROM sessions
                WHERE expires_at < NOW()
                LIMIT $1
            )
            "#,
        )
        .bind(batch_size)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
