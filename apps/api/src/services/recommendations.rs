//! AI recommendation service
//!
//! Describes the user's recent listening to Gemini, parses the suggested
//! songs and resolves each one against the Spotify catalog.

use museboxd_gemini_client::GeminiClient;
use museboxd_spotify_client::{
    models::{AudioFeaturesList, RecentlyPlayed, TrackSearch},
    SearchParams, SpotifyClient,
};

use crate::error::{ApiError, ApiResult};
use crate::models::recommendation::{
    AiSuggestion, ListenedTrack, RecommendedTrack, TrackFeatures,
};

/// Recent plays described in the prompt
const HISTORY_LIMIT: u32 = 10;

/// Songs requested from the model
const SUGGESTION_COUNT: usize = 8;

/// Album art used when a suggestion is not in the catalog
pub const PLACEHOLDER_ALBUM_ART: &str = "/placeholder.svg?height=150&width=150";

#[derive(Clone)]
pub struct RecommendationService {
    spotify: SpotifyClient,
    gemini: GeminiClient,
}

impl RecommendationService {
    pub fn new(spotify: SpotifyClient, gemini: GeminiClient) -> Self {
        Self { spotify, gemini }
    }

    /// Personalized recommendations for the owner of `token`
    ///
    /// # Errors
    /// - `ApiError::Upstream` if the listening history cannot be fetched
    /// - `ApiError::AiService` if Gemini fails
    /// - `ApiError::Internal` if the model's answer is not a JSON array of songs
    pub async fn personalized(&self, token: &str) -> ApiResult<Vec<RecommendedTrack>> {
        let recent: RecentlyPlayed = self
            .spotify
            .recently_played(token, HISTORY_LIMIT)
            .await
            .map_err(|e| ApiError::spotify("fetch recently played tracks", e))?;

        let mut tracks: Vec<ListenedTrack> = recent
            .items
            .into_iter()
            .map(|play| ListenedTrack {
                artist: play.track.artist_names(),
                album: play.track.album.name,
                popularity: play.track.popularity,
                name: play.track.name,
                id: play.track.id,
                features: None,
            })
            .collect();

        self.attach_audio_features(token, &mut tracks).await;

        let prompt = build_prompt(&tracks)?;
        // sampling comes from GeminiConfig (0.7 / 1000 tokens by default)
        let text = self.gemini.generate(&prompt).await?;

        let suggestions = parse_suggestions(&text).map_err(|e| {
            tracing::error!(error = %e, response = %text, "Unparseable AI recommendations");
            ApiError::Internal("Failed to parse AI recommendations".to_string())
        })?;

        let mut recommendations = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            let params = SearchParams::new(
                format!("track:{} artist:{}", suggestion.name, suggestion.artist),
                "track",
            )
            .page(1, 0);

            match self.spotify.search::<TrackSearch>(token, &params).await {
                Ok(found) => {
                    let next_index = recommendations.len();
                    recommendations.push(resolve(suggestion, found, next_index));
                }
                Err(e) => {
                    tracing::warn!(name = %suggestion.name, error = %e, "Skipping recommendation after search failure");
                }
            }
        }

        tracing::info!(count = recommendations.len(), "Built AI recommendations");
        Ok(recommendations)
    }

    /// Audio features are optional context; failures only cost prompt detail
    async fn attach_audio_features(&self, token: &str, tracks: &mut [ListenedTrack]) {
        let ids: Vec<String> = tracks.iter().filter_map(|t| t.id.clone()).collect();
        if ids.is_empty() {
            return;
        }

        match self
            .spotify
            .audio_features::<AudioFeaturesList>(token, &ids)
            .await
        {
            Ok(list) => apply_audio_features(tracks, list),
            Err(e) => tracing::warn!(error = %e, "Failed to fetch audio features"),
        }
    }
}

/// Pair features with the tracks whose ids were requested, in request order
fn apply_audio_features(tracks: &mut [ListenedTrack], list: AudioFeaturesList) {
    let requested = tracks.iter_mut().filter(|t| t.id.is_some());
    for (track, features) in requested.zip(list.audio_features) {
        track.features = features.map(|f| TrackFeatures {
            danceability: f.danceability,
            energy: f.energy,
            tempo: f.tempo,
            valence: f.valence,
        });
    }
}

pub fn build_prompt(tracks: &[ListenedTrack]) -> ApiResult<String> {
    let listening = serde_json::to_string_pretty(tracks)?;

    Ok(format!(
        r#"I need music recommendations based on a user's recently played tracks.
Here are the user's recently played tracks:
{listening}
Based on these tracks, identify patterns in the user's music taste (genres, moods, artists, etc.)
and recommend {SUGGESTION_COUNT} specific songs that they might enjoy but haven't listened to recently.
For each recommendation, provide:
1. Song name
2. Artist name
3. A brief reason why they might like it based on their listening history
Format your response as a JSON array with this structure:
[
  {{
    "name": "Song Name",
    "artist": "Artist Name",
    "reason": "Brief reason for recommendation"
  }}
]
Only return the JSON array, nothing else."#
    ))
}

/// Parse the model's answer, tolerating Markdown fences and stray prose
pub fn parse_suggestions(text: &str) -> Result<Vec<AiSuggestion>, serde_json::Error> {
    let trimmed = text.trim();
    if let Ok(parsed) = serde_json::from_str(trimmed) {
        return Ok(parsed);
    }

    let unfenced = trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    match (unfenced.find('['), unfenced.rfind(']')) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&unfenced[start..=end]),
        _ => serde_json::from_str(unfenced),
    }
}

/// Build the output entry for one suggestion from its search result
fn resolve(suggestion: AiSuggestion, found: TrackSearch, next_index: usize) -> RecommendedTrack {
    match found.tracks.items.into_iter().next() {
        Some(track) => RecommendedTrack {
            artist: track.artist_names(),
            album_art: track
                .album_art()
                .unwrap_or(PLACEHOLDER_ALBUM_ART)
                .to_string(),
            album: Some(track.album.name),
            id: track
                .id
                .unwrap_or_else(|| format!("ai-rec-{}", next_index)),
            name: track.name,
            reason: suggestion.reason,
            uri: track.uri,
        },
        None => RecommendedTrack {
            id: format!("ai-rec-{}", next_index),
            name: suggestion.name,
            artist: suggestion.artist,
            album: None,
            album_art: PLACEHOLDER_ALBUM_ART.to_string(),
            reason: suggestion.reason,
            uri: None,
        },
    }
}
