//! User repository

use sqlx::PgPool;

use super::utils::USER_COLUMNS;
use crate::models::user::{UpsertUser, User};

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the user or refresh their profile, marking them active
    pub async fn upsert(&self, user: &UpsertUser) -> Result<User, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (id, display_name, email, image_url, last_activity_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                image_url = EXCLUDED.image_url,
                last_activity_at = NOW(),
                updated_at = NOW()
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(&user.id)
            .bind(&user.display_name)
            .bind(&user.email)
            .bind(&user.image_url)
            .fetch_one(&self.pool)
            .await
    }

    /// Record activity for the friend feed
    ///
    /// Returns `false` when no such user exists.
    pub async fn touch_activity(&self, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_activity_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
