//! Models for the AI recommendation flow

use serde::{Deserialize, Serialize};

/// Audio features included in the prompt when Spotify provides them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub tempo: f64,
    pub valence: f64,
}

/// A recently played track as described to the model
#[derive(Debug, Clone, Serialize)]
pub struct ListenedTrack {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub popularity: Option<u32>,
    /// `None` for local files
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<TrackFeatures>,
}

/// One suggestion as returned by the model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiSuggestion {
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub reason: String,
}

/// A suggestion resolved (or not) against the Spotify catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedTrack {
    /// Spotify track id, or `ai-rec-{n}` when the catalog had no match
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    pub album_art: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Response body of the personalized recommendation route
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<RecommendedTrack>,
}
