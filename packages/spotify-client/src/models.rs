//! Spotify Web API response models
//!
//! Only the fields the backend reads are modelled. Everything else is
//! ignored during deserialization, so these types can be used as typed
//! views over the raw JSON that routes forward unchanged.

use serde::{Deserialize, Serialize};

/// Accounts service token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    pub expires_in: u64,
    /// Present on user grants; refresh grants may omit it
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Image attached to albums, artists, playlists and users
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Simplified artist object embedded in tracks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Simplified album object embedded in tracks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Track object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// `null` for local files
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: AlbumRef,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub uri: Option<String>,
}

impl Track {
    /// Artist names joined with ", "
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// URL of the first album image, if any
    pub fn album_art(&self) -> Option<&str> {
        self.album.images.first().map(|i| i.url.as_str())
    }
}

/// Generic paging object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

/// One entry of `me/player/recently-played`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistory {
    pub track: Track,
    /// RFC 3339 timestamp
    pub played_at: String,
}

/// `me/player/recently-played` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayed {
    pub items: Vec<PlayHistory>,
}

/// `recommendations` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub tracks: Vec<Track>,
}

/// Track search response (`search?type=track`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSearch {
    pub tracks: Paging<Track>,
}

/// Audio features for a single track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioFeatures {
    pub id: String,
    pub danceability: f64,
    pub energy: f64,
    pub tempo: f64,
    pub valence: f64,
}

/// `audio-features?ids=` response; unknown ids come back as `null`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesList {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

/// `me` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Error body returned by the Web API
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// The Web API nests `{status, message}`; the accounts service uses a bare
/// string plus `error_description`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ApiErrorDetail {
    Detailed { message: String },
    Code(String),
}
