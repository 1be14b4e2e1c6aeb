//! Mock Spotify server
//!
//! Serves both hosts from one [`wiremock::MockServer`]: `/api/token` for the
//! accounts service and `/v1/...` for the Web API, matching
//! `SpotifyConfig::with_base_url`.

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Access token handed out by [`MockSpotifyServer::mock_app_token`]
pub const APP_TOKEN: &str = "mock-app-token";

/// Minimal track object in Web API shape
pub fn track_json(id: &str, name: &str, artist: &str, album: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "uri": format!("spotify:track:{}", id),
        "popularity": 50,
        "artists": [{"id": format!("{}-artist", id), "name": artist}],
        "album": {
            "name": album,
            "images": [{"url": format!("https://i.scdn.co/image/{}", id), "height": 640, "width": 640}]
        }
    })
}

/// Mock Spotify accounts service and Web API
pub struct MockSpotifyServer {
    server: MockServer,
}

impl MockSpotifyServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL for both hosts
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Underlying server, for one-off mocks
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Client-credentials grant succeeds with [`APP_TOKEN`]
    pub async fn mock_app_token(&self) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": APP_TOKEN,
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(&self.server)
            .await;
    }

    /// Refresh grant succeeds with the given access token
    pub async fn mock_refresh_token(&self, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": access_token,
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(&self.server)
            .await;
    }

    /// `GET /v1/{api_path}` answers 200 with `body`
    pub async fn mock_get(&self, api_path: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/{}", api_path.trim_start_matches('/'))))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// `GET /v1/{api_path}` answers with a Web API error body
    pub async fn mock_get_failure(&self, api_path: &str, status: u16, message: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/{}", api_path.trim_start_matches('/'))))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"status": status, "message": message}
            })))
            .mount(&self.server)
            .await;
    }

    /// `GET /v1/me` for the given user
    pub async fn mock_current_user(&self, id: &str, display_name: &str) {
        self.mock_get(
            "me",
            json!({
                "id": id,
                "display_name": display_name,
                "email": format!("{}@example.com", id),
                "images": [{"url": format!("https://i.scdn.co/user/{}", id)}]
            }),
        )
        .await;
    }

    /// Recently played history built from track objects, newest first
    pub async fn mock_recently_played(&self, tracks: Vec<Value>) {
        let items: Vec<Value> = tracks
            .into_iter()
            .enumerate()
            .map(|(i, track)| {
                json!({
                    "track": track,
                    "played_at": format!("2024-05-01T12:{:02}:00.000Z", 59 - (i % 60))
                })
            })
            .collect();

        self.mock_get(
            "me/player/recently-played",
            json!({"items": items, "limit": items.len()}),
        )
        .await;
    }

    /// Track search for the exact query `q` returns `tracks`
    pub async fn mock_track_search(&self, q: &str, tracks: Vec<Value>) {
        let total = tracks.len();
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", q))
            .and(query_param("type", "track"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tracks": {"items": tracks, "total": total, "limit": 1, "offset": 0}
            })))
            .mount(&self.server)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_app_token() {
        let server = MockSpotifyServer::start().await;
        server.mock_app_token().await;

        let body: Value = reqwest::Client::new()
            .post(format!("{}/api/token", server.url()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["access_token"], APP_TOKEN);
    }

    #[tokio::test]
    async fn test_mock_get_failure() {
        let server = MockSpotifyServer::start().await;
        server.mock_get_failure("albums/x", 404, "Non existing id").await;

        let response = reqwest::get(format!("{}/v1/albums/x", server.url()))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }

    #[test]
    fn test_track_json_shape() {
        let track = track_json("t1", "Song", "Band", "Record");
        assert_eq!(track["artists"][0]["name"], "Band");
        assert_eq!(track["uri"], "spotify:track:t1");
    }
}
