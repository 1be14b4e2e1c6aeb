//! Diary entry repository
//!
//! Plain parameterized CRUD over diary_entries. Ownership checks belong to
//! the diary service; these queries filter by id only, except listing.

use sqlx::PgPool;
use uuid::Uuid;

use super::utils::DIARY_ENTRY_COLUMNS;
use crate::models::diary::{DiaryEntry, NewDiaryEntry};

/// Repository for diary entry database operations
#[derive(Clone)]
pub struct DiaryRepository {
    pool: PgPool,
}

impl DiaryRepository {
    /// Create a new DiaryRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an entry for `user_id`, returning its id
    pub async fn create(&self, user_id: &str, entry: &NewDiaryEntry) -> Result<Uuid, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO diary_entries (
                id, user_id, item_id, item_type,
                title, artist, image_url, rating, review
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&entry.item_id)
        .bind(entry.item_type)
        .bind(&entry.title)
        .bind(&entry.artist)
        .bind(&entry.image_url)
        .bind(entry.rating)
        .bind(&entry.review)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// All entries of a user, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<DiaryEntry>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {}
            FROM diary_entries
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            "#,
            DIARY_ENTRY_COLUMNS
        );

        sqlx::query_as::<_, DiaryEntry>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DiaryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM diary_entries WHERE id = $1",
            DIARY_ENTRY_COLUMNS
        );

        sqlx::query_as::<_, DiaryEntry>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Update rating and review; returns `false` if the entry vanished
    /// Set the rating, and the review when one is given
    pub async fn update(
        &self,
        id: Uuid,
        rating: f32,
        review: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE diary_entries
            SET rating = $1, review = COALESCE($2, review), updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(rating)
        .bind(review)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM diary_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
