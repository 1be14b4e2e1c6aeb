//! Spotify proxy service
//!
//! Catalog calls run with the cached client-credentials token; user calls
//! run with the session's Spotify token. Successful responses are returned
//! as raw JSON so routes forward Spotify's shape unchanged.

use chrono::{DateTime, Utc};
use museboxd_spotify_client::{
    models::{RecentlyPlayed, Recommendations},
    SearchParams, SpotifyClient,
};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::models::activity::NewPlay;
use crate::repositories::{ListeningHistoryRepository, UserRepository};

/// Tracks fetched when looking for artists of a genre
const GENRE_SEED_TRACKS: u32 = 100;

const RECENTLY_PLAYED_LIMIT: u32 = 50;

/// Plays used as recommendation seeds
const SEED_PLAYS: usize = 2;

#[derive(Clone)]
pub struct SpotifyService {
    client: SpotifyClient,
    users: UserRepository,
    history: ListeningHistoryRepository,
}

impl SpotifyService {
    pub fn new(
        client: SpotifyClient,
        users: UserRepository,
        history: ListeningHistoryRepository,
    ) -> Self {
        Self {
            client,
            users,
            history,
        }
    }

    /// Client-credentials token for catalog calls
    pub async fn app_token(&self) -> ApiResult<String> {
        self.client
            .app_token()
            .await
            .map_err(|e| ApiError::spotify("fetch token", e))
    }

    // ========== App-token routes ==========

    pub async fn search(&self, params: &SearchParams) -> ApiResult<Value> {
        if params.query.trim().is_empty() {
            return Err(ApiError::InvalidQueryParam {
                name: "q",
                reason: "Query parameter is required".to_string(),
            });
        }

        let token = self.app_token().await?;
        self.client
            .search(&token, params)
            .await
            .map_err(|e| ApiError::spotify("search Spotify", e))
    }

    pub async fn genres(&self) -> ApiResult<Value> {
        let token = self.app_token().await?;
        self.client
            .available_genre_seeds(&token)
            .await
            .map_err(|e| ApiError::spotify("fetch genres", e))
    }

    /// Artists associated with a genre, paginated locally
    ///
    /// Artists are taken from a large recommendation set seeded with the
    /// genre. When that set names no artists, Spotify's genre search is
    /// returned instead.
    pub async fn genre_artists(&self, genre: &str, limit: u32, offset: u32) -> ApiResult<Value> {
        let token = self.app_token().await?;

        let seeds = [
            ("seed_genres", genre.to_string()),
            ("limit", GENRE_SEED_TRACKS.to_string()),
        ];
        let recommendations: Recommendations = self
            .client
            .recommendations(&token, &seeds)
            .await
            .map_err(|e| ApiError::spotify("fetch genre recommendations", e))?;

        let artist_ids = unique_artist_ids(&recommendations);
        if artist_ids.is_empty() {
            let params = SearchParams::new(format!("genre:{}", genre), "artist").page(limit, offset);
            return self
                .client
                .search(&token, &params)
                .await
                .map_err(|e| ApiError::spotify("search for genre artists", e));
        }

        // the client sends at most the first 50 ids
        let artists: Value = self
            .client
            .artists(&token, &artist_ids)
            .await
            .map_err(|e| ApiError::spotify("fetch artists", e))?;

        let all: &[Value] = artists
            .get("artists")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(paginate_artists(all, limit, offset))
    }

    pub async fn album(&self, id: &str) -> ApiResult<Value> {
        let token = self.app_token().await?;
        self.client
            .album(&token, id)
            .await
            .map_err(|e| ApiError::spotify("fetch album", e))
    }

    pub async fn artist_top_tracks(&self, id: &str, market: &str) -> ApiResult<Value> {
        let token = self.app_token().await?;
        self.client
            .artist_top_tracks(&token, id, market)
            .await
            .map_err(|e| ApiError::spotify("fetch artist top tracks", e))
    }

    // ========== User-token routes ==========

    pub async fn new_releases(&self, token: &str, limit: u32, offset: u32) -> ApiResult<Value> {
        self.client
            .new_releases(token, limit, offset)
            .await
            .map_err(|e| ApiError::spotify("fetch new releases", e))
    }

    /// Recently played tracks; the plays are also recorded for the friend feed
    pub async fn recently_played(&self, user_id: &str, token: &str) -> ApiResult<Value> {
        let body: Value = self
            .client
            .recently_played(token, RECENTLY_PLAYED_LIMIT)
            .await
            .map_err(|e| ApiError::spotify("fetch recently played tracks", e))?;

        self.record_history(user_id, &body).await;

        Ok(body)
    }

    /// Best effort: failures are logged and swallowed
    async fn record_history(&self, user_id: &str, body: &Value) {
        let plays = match serde_json::from_value::<RecentlyPlayed>(body.clone()) {
            Ok(recent) => plays_from(recent),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Unexpected recently-played shape");
                return;
            }
        };

        match self.history.record_plays(user_id, &plays).await {
            Ok(inserted) => {
                tracing::debug!(user_id = %user_id, inserted, "Recorded listening history")
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to record listening history")
            }
        }

        if let Err(e) = self.users.touch_activity(user_id).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to update user activity");
        }
    }

    pub async fn saved_tracks(&self, token: &str, limit: u32, offset: u32) -> ApiResult<Value> {
        self.client
            .saved_tracks(token, limit, offset)
            .await
            .map_err(|e| ApiError::spotify("fetch user liked tracks", e))
    }

    pub async fn my_playlists(&self, token: &str) -> ApiResult<Value> {
        self.client
            .my_playlists(token)
            .await
            .map_err(|e| ApiError::spotify("fetch user playlists", e))
    }

    pub async fn playlist(&self, token: &str, id: &str) -> ApiResult<Value> {
        self.client
            .playlist(token, id)
            .await
            .map_err(|e| ApiError::spotify("fetch playlist", e))
    }

    pub async fn playlist_tracks(&self, token: &str, id: &str) -> ApiResult<Value> {
        self.client
            .playlist_tracks(token, id)
            .await
            .map_err(|e| ApiError::spotify("fetch playlist tracks", e))
    }

    /// Spotify recommendations seeded by the two most recent plays
    pub async fn recommendations(&self, token: &str) -> ApiResult<Value> {
        let recent: RecentlyPlayed = self
            .client
            .recently_played(token, 5)
            .await
            .map_err(|e| ApiError::spotify("fetch recently played tracks", e))?;

        let Some(seeds) = seed_params(&recent) else {
            return Ok(json!({ "tracks": [] }));
        };

        self.client
            .recommendations(token, &seeds)
            .await
            .map_err(|e| ApiError::spotify("fetch recommendations", e))
    }
}

/// Artist ids in first-seen order, without duplicates
fn unique_artist_ids(recommendations: &Recommendations) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for artist in recommendations.tracks.iter().flat_map(|t| &t.artists) {
        if let Some(id) = &artist.id {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    ids
}

fn paginate_artists(all: &[Value], limit: u32, offset: u32) -> Value {
    let items: Vec<&Value> = all
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    json!({
        "artists": {
            "items": items,
            "total": all.len(),
            "limit": limit,
            "offset": offset,
        }
    })
}

/// `seed_tracks`/`seed_artists` from the most recent catalog plays, or
/// `None` when there is nothing to seed with
///
/// Local files have no id and are skipped.
fn seed_params(recent: &RecentlyPlayed) -> Option<Vec<(&'static str, String)>> {
    let seeds: Vec<_> = recent
        .items
        .iter()
        .filter(|p| p.track.id.is_some())
        .take(SEED_PLAYS)
        .collect();
    if seeds.is_empty() {
        return None;
    }

    let track_ids: Vec<&str> = seeds
        .iter()
        .filter_map(|p| p.track.id.as_deref())
        .collect();
    let artist_ids: Vec<&str> = seeds
        .iter()
        .filter_map(|p| p.track.artists.first().and_then(|a| a.id.as_deref()))
        .collect();

    Some(vec![
        ("seed_tracks", track_ids.join(",")),
        ("seed_artists", artist_ids.join(",")),
        ("limit", "10".to_string()),
    ])
}

fn plays_from(recent: RecentlyPlayed) -> Vec<NewPlay> {
    recent
        .items
        .into_iter()
        .filter_map(|play| {
            let track_id = play.track.id.clone()?;
            let played_at = DateTime::parse_from_rfc3339(&play.played_at)
                .ok()?
                .with_timezone(&Utc);
            Some(NewPlay {
                artist_name: play.track.artist_names(),
                album_image: play.track.album_art().map(str::to_string),
                track_id,
                track_name: play.track.name,
                played_at,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recent(tracks: Value) -> RecentlyPlayed {
        serde_json::from_value(json!({ "items": tracks })).unwrap()
    }

    fn play(id: &str, artist_id: &str, played_at: &str) -> Value {
        json!({
            "track": {
                "id": id,
                "name": format!("Track {}", id),
                "artists": [{"id": artist_id, "name": format!("Artist {}", artist_id)}],
                "album": {"name": "Album", "images": [{"url": "https://i.scdn.co/image/1"}]}
            },
            "played_at": played_at
        })
    }

    #[test]
    fn test_unique_artist_ids_keep_first_seen_order() {
        let recs: Recommendations = serde_json::from_value(json!({
            "tracks": [
                {"id": "t1", "name": "a", "artists": [{"id": "b", "name": "B"}, {"id": "a", "name": "A"}]},
                {"id": "t2", "name": "b", "artists": [{"id": "a", "name": "A"}, {"id": "c", "name": "C"}]}
            ]
        }))
        .unwrap();

        assert_eq!(unique_artist_ids(&recs), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_paginate_artists() {
        let all: Vec<Value> = (0..5).map(|i| json!({ "id": i })).collect();

        let page = paginate_artists(&all, 2, 1);
        assert_eq!(page["artists"]["items"], json!([{"id": 1}, {"id": 2}]));
        assert_eq!(page["artists"]["total"], 5);
        assert_eq!(page["artists"]["limit"], 2);
        assert_eq!(page["artists"]["offset"], 1);

        let past_end = paginate_artists(&all, 20, 10);
        assert_eq!(past_end["artists"]["items"], json!([]));
    }

    #[test]
    fn test_seed_params_use_two_most_recent_plays() {
        let recent = recent(json!([
            play("t1", "a1", "2024-05-01T10:00:00Z"),
            play("t2", "a2", "2024-05-01T09:00:00Z"),
            play("t3", "a3", "2024-05-01T08:00:00Z"),
        ]));

        let seeds = seed_params(&recent).unwrap();
        assert_eq!(seeds[0], ("seed_tracks", "t1,t2".to_string()));
        assert_eq!(seeds[1], ("seed_artists", "a1,a2".to_string()));
        assert_eq!(seeds[2], ("limit", "10".to_string()));
    }

    #[test]
    fn test_local_files_are_skipped() {
        let local = json!({
            "track": {"id": null, "is_local": true, "name": "demo.mp3", "artists": [{"id": null, "name": "Me"}]},
            "played_at": "2024-05-01T11:00:00Z"
        });
        let recent = recent(json!([
            local,
            play("t1", "a1", "2024-05-01T10:00:00Z"),
            play("t2", "a2", "2024-05-01T09:00:00Z"),
        ]));

        let seeds = seed_params(&recent).unwrap();
        assert_eq!(seeds[0], ("seed_tracks", "t1,t2".to_string()));
        assert_eq!(seeds[1], ("seed_artists", "a1,a2".to_string()));

        let plays = plays_from(recent);
        let ids: Vec<&str> = plays.iter().map(|p| p.track_id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_seed_params_only_local_files() {
        let recent = recent(json!([{
            "track": {"id": null, "name": "demo.mp3", "artists": []},
            "played_at": "2024-05-01T11:00:00Z"
        }]));
        assert!(seed_params(&recent).is_none());
    }

    #[test]
    fn test_seed_params_without_plays() {
        assert!(seed_params(&recent(json!([]))).is_none());
    }

    #[test]
    fn test_plays_from_skips_bad_timestamps() {
        let plays = plays_from(recent(json!([
            play("t1", "a1", "2024-05-01T10:00:00.123Z"),
            play("t2", "a2", "yesterday"),
        ])));

        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].track_id, "t1");
        assert_eq!(plays[0].artist_name, "Artist a1");
        assert_eq!(plays[0].album_image.as_deref(), Some("https://i.scdn.co/image/1"));
    }
}
