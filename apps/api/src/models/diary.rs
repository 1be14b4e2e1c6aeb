//! Diary entry models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of item a diary entry rates, matching PostgreSQL diary_item_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "diary_item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiaryItemType {
    Track,
    Album,
}

impl std::str::FromStr for DiaryItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "track" => Ok(Self::Track),
            "album" => Ok(Self::Album),
            other => Err(format!("itemType must be 'track' or 'album', got '{}'", other)),
        }
    }
}

/// Diary entry from the diary_entries table
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: Uuid,
    pub user_id: String,
    /// Spotify track or album id
    pub item_id: String,
    pub item_type: DiaryItemType,
    pub title: String,
    pub artist: String,
    pub image_url: String,
    /// 0.5 to 5.0 in half steps
    pub rating: f32,
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/diary`
///
/// Every field is optional at the parsing stage so a missing field can be
/// reported by name instead of as a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiaryEntryRequest {
    pub item_id: Option<String>,
    pub item_type: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<f64>,
    pub review: Option<String>,
}

/// Body of `PUT /api/diary/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDiaryEntryRequest {
    pub rating: Option<f64>,
    pub review: Option<String>,
}

/// Validated values for an insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewDiaryEntry {
    pub item_id: String,
    pub item_type: DiaryItemType,
    pub title: String,
    pub artist: String,
    pub image_url: String,
    pub rating: f32,
    pub review: String,
}
