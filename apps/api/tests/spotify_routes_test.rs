//! Integration tests for the Spotify catalog routes
//!
//! Catalog routes run on the app token and need no session or database, so
//! these tests only need the mock Spotify server.

mod common;

use axum::http::StatusCode;
use museboxd_test_utils::track_json;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::{auth_get_request, get_request, parse_body_value, TestApp};

#[tokio::test]
async fn test_token_route_returns_app_token() {
    let app = TestApp::without_db().await;
    app.spotify.mock_app_token().await;

    let response = app.request(get_request("/api/spotify/token")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body_value(response).await;
    assert_eq!(body["access_token"], "mock-app-token");
}

#[tokio::test]
async fn test_token_route_mirrors_accounts_failure() {
    let app = TestApp::without_db().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Invalid client"
        })))
        .mount(app.spotify.server())
        .await;

    let response = app.request(get_request("/api/spotify/token")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_body_value(response).await;
    assert_eq!(body["message"], "Failed to fetch token");
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = TestApp::without_db().await;

    let response = app.request(get_request("/api/spotify/search")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_body_value(response).await;
    assert_eq!(body["code"], "INVALID_QUERY_PARAM");

    let response = app.request(get_request("/api/spotify/search?q=%20")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unparseable_paging_is_json_error() {
    let app = TestApp::without_db().await;

    let response = app
        .request(get_request("/api/spotify/search?q=radiohead&limit=lots"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_body_value(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_search_forwards_defaults() {
    let app = TestApp::without_db().await;
    app.spotify.mock_app_token().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "radiohead"))
        .and(query_param("type", "artist,album,track,playlist"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artists": {"items": [{"id": "4Z8W4fKeB5YxbusRsdQVPb", "name": "Radiohead"}]}
        })))
        .mount(app.spotify.server())
        .await;

    let response = app
        .request(get_request("/api/spotify/search?q=radiohead"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body_value(response).await;
    assert_eq!(body["artists"]["items"][0]["name"], "Radiohead");
}

#[tokio::test]
async fn test_genres_are_forwarded() {
    let app = TestApp::without_db().await;
    app.spotify.mock_app_token().await;
    app.spotify
        .mock_get(
            "recommendations/available-genre-seeds",
            json!({"genres": ["acoustic", "ambient", "jazz"]}),
        )
        .await;

    let response = app.request(get_request("/api/spotify/genres")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body_value(response).await;
    assert_eq!(body["genres"], json!(["acoustic", "ambient", "jazz"]));
}

#[tokio::test]
async fn test_genre_artists_are_paginated_locally() {
    let app = TestApp::without_db().await;
    app.spotify.mock_app_token().await;

    Mock::given(method("GET"))
        .and(path("/v1/recommendations"))
        .and(query_param("seed_genres", "jazz"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": [
                track_json("t1", "So What", "Miles Davis", "Kind of Blue"),
                track_json("t2", "Naima", "John Coltrane", "Giant Steps"),
                track_json("t3", "Blue in Green", "Miles Davis", "Kind of Blue"),
            ]
        })))
        .mount(app.spotify.server())
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/artists"))
        .and(query_param("ids", "t1-artist,t2-artist,t3-artist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artists": [
                {"id": "t1-artist", "name": "Miles Davis"},
                {"id": "t2-artist", "name": "John Coltrane"},
                {"id": "t3-artist", "name": "Miles Davis"}
            ]
        })))
        .mount(app.spotify.server())
        .await;

    let response = app
        .request(get_request("/api/spotify/genres/jazz?limit=2&offset=1"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body_value(response).await;
    assert_eq!(body["artists"]["total"], 3);
    assert_eq!(body["artists"]["limit"], 2);
    assert_eq!(body["artists"]["offset"], 1);
    assert_eq!(body["artists"]["items"][0]["name"], "John Coltrane");
    assert_eq!(body["artists"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_genre_artists_fall_back_to_search() {
    let app = TestApp::without_db().await;
    app.spotify.mock_app_token().await;
    app.spotify
        .mock_get("recommendations", json!({"tracks": []}))
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "genre:vaporwave"))
        .and(query_param("type", "artist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artists": {"items": [{"id": "x", "name": "Macintosh Plus"}], "total": 1}
        })))
        .mount(app.spotify.server())
        .await;

    let response = app
        .request(get_request("/api/spotify/genres/vaporwave"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body_value(response).await;
    assert_eq!(body["artists"]["items"][0]["name"], "Macintosh Plus");
}

#[tokio::test]
async fn test_album_is_forwarded() {
    let app = TestApp::without_db().await;
    app.spotify.mock_app_token().await;
    app.spotify
        .mock_get(
            "albums/4aawyAB9vmqN3uQ7FjRGTy",
            json!({"id": "4aawyAB9vmqN3uQ7FjRGTy", "name": "Global Warming"}),
        )
        .await;

    let response = app
        .request(get_request("/api/spotify/album/4aawyAB9vmqN3uQ7FjRGTy"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body_value(response).await;
    assert_eq!(body["name"], "Global Warming");
}

#[tokio::test]
async fn test_album_not_found_keeps_spotify_status() {
    let app = TestApp::without_db().await;
    app.spotify.mock_app_token().await;
    app.spotify
        .mock_get_failure("albums/missing", 404, "Non existing id")
        .await;

    let response = app.request(get_request("/api/spotify/album/missing")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_body_value(response).await;
    assert_eq!(body["message"], "Failed to fetch album");
}

#[tokio::test]
async fn test_artist_top_tracks_default_market() {
    let app = TestApp::without_db().await;
    app.spotify.mock_app_token().await;
    Mock::given(method("GET"))
        .and(path("/v1/artists/0OdUWJ0sBjDrqHygGUXeCF/top-tracks"))
        .and(query_param("market", "US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": [track_json("t1", "Holland, 1945", "Neutral Milk Hotel", "Aeroplane")]
        })))
        .mount(app.spotify.server())
        .await;

    let response = app
        .request(get_request("/api/spotify/artist/0OdUWJ0sBjDrqHygGUXeCF/top-tracks"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body_value(response).await;
    assert_eq!(body["tracks"][0]["name"], "Holland, 1945");
}

#[tokio::test]
async fn test_user_routes_require_session() {
    let app = TestApp::without_db().await;

    for uri in [
        "/api/spotify/new-releases",
        "/api/spotify/me/recently-played",
        "/api/spotify/me/tracks",
        "/api/spotify/me/playlists",
        "/api/spotify/playlist/37i9dQZF1DXcBWIGoYBM5M",
        "/api/spotify/playlist/37i9dQZF1DXcBWIGoYBM5M/tracks",
        "/api/spotify/recommendations",
        "/api/spotify/personalized-recommendations",
        "/api/spotify/ai-recommendations",
    ] {
        let response = app.request(get_request(uri)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_user_routes_reject_forged_token() {
    let app = TestApp::without_db().await;

    let response = app
        .request(auth_get_request("/api/spotify/me/tracks", "not-a-jwt"))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_body_value(response).await;
    assert_eq!(body["code"], "INVALID_TOKEN");
}
