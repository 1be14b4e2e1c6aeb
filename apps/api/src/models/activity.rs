//! Listening history and friend activity models

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A play to record in listening_history
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlay {
    pub track_id: String,
    pub track_name: String,
    pub artist_name: String,
    pub album_image: Option<String>,
    pub played_at: DateTime<Utc>,
}

/// Another user's most recent play
#[derive(Debug, Clone, FromRow)]
pub struct FriendActivityRow {
    pub user_id: String,
    pub display_name: String,
    pub image_url: Option<String>,
    pub track_name: String,
    pub artist_name: String,
    pub played_at: DateTime<Utc>,
}

/// One entry of the friend activity feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FriendActivity {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub song: String,
    pub artist: String,
    /// Relative time such as "5m ago"
    pub time: String,
}
