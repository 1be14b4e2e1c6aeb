//! Listening history repository
//!
//! Fed from the recently-played route; read by the friend activity feed.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::activity::{FriendActivityRow, NewPlay};

/// Repository for listening history database operations
#[derive(Clone)]
pub struct ListeningHistoryRepository {
    pool: PgPool,
}

impl ListeningHistoryRepository {
    /// Create a new ListeningHistoryRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record plays, skipping ones already stored
    ///
    /// Returns the number of new rows.
    pub async fn record_plays(&self, user_id: &str, plays: &[NewPlay]) -> Result<u64, sqlx::Error> {
        if plays.is_empty() {
            return Ok(0);
        }

        let track_ids: Vec<&str> = plays.iter().map(|p| p.track_id.as_str()).collect();
        let track_names: Vec<&str> = plays.iter().map(|p| p.track_name.as_str()).collect();
        let artist_names: Vec<&str> = plays.iter().map(|p| p.artist_name.as_str()).collect();
        let album_images: Vec<Option<&str>> =
            plays.iter().map(|p| p.album_image.as_deref()).collect();
        let played_at: Vec<DateTime<Utc>> = plays.iter().map(|p| p.played_at).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO listening_history (
                user_id, track_id, track_name, artist_name, album_image, played_at
            )
            SELECT $1, t.track_id, t.track_name, t.artist_name, t.album_image, t.played_at
            FROM UNNEST($2::text[], $3::text[], $4::text[], $5::text[], $6::timestamptz[])
                AS t(track_id, track_name, artist_name, album_image, played_at)
            ON CONFLICT (user_id, track_id, played_at) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&track_ids)
        .bind(&track_names)
        .bind(&artist_names)
        .bind(&album_images)
        .bind(&played_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Latest play of each other user active since `since`, most recently active first
    ///
    /// Users without any recorded play are left out.
    pub async fn friend_activity(
        &self,
        exclude_user_id: &str,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<FriendActivityRow>, sqlx::Error> {
        sqlx::query_as::<_, FriendActivityRow>(
            r#"
            SELECT
                u.id AS user_id,
                u.display_name,
                u.image_url,
                h.track_name,
                h.artist_name,
                h.played_at
            FROM users u
            JOIN LATERAL (
                SELECT track_name, artist_name, played_at
                FROM listening_history
                WHERE user_id = u.id
                ORDER BY played_at DESC
                LIMIT 1
            ) h ON true
            WHERE u.id <> $1
              AND u.last_activity_at >= $2
            ORDER BY u.last_activity_at DESC
            LIMIT $3
            "#,
        )
        .bind(exclude_user_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
