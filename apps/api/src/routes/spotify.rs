//! Spotify proxy route handlers
//!
//! Catalog routes use the app token and need no session:
//! - `GET /api/spotify/token`
//! - `GET /api/spotify/search`
//! - `GET /api/spotify/genres`, `GET /api/spotify/genres/{genre}`
//! - `GET /api/spotify/album/{id}`, `GET /api/spotify/artist/{id}/top-tracks`
//!
//! User routes forward the session's Spotify token:
//! - `GET /api/spotify/new-releases`
//! - `GET /api/spotify/me/recently-played`, `/me/tracks`, `/me/playlists`
//! - `GET /api/spotify/playlist/{id}`, `/playlist/{id}/tracks`
//! - `GET /api/spotify/recommendations`
//! - `GET /api/spotify/personalized-recommendations` (alias `ai-recommendations`)

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use museboxd_spotify_client::SearchParams;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::middleware::{ApiQuery, AuthUser};
use crate::models::recommendation::RecommendationsResponse;
use crate::services::{RecommendationService, SpotifyService};

const DEFAULT_SEARCH_TYPES: &str = "artist,album,track,playlist";

#[derive(Clone)]
pub struct SpotifyState {
    pub spotify_service: Arc<SpotifyService>,
    pub recommendation_service: Arc<RecommendationService>,
    /// Market for top tracks when the caller names none
    pub default_market: Arc<str>,
}

impl SpotifyState {
    pub fn new(
        spotify_service: SpotifyService,
        recommendation_service: RecommendationService,
        default_market: &str,
    ) -> Self {
        Self {
            spotify_service: Arc::new(spotify_service),
            recommendation_service: Arc::new(recommendation_service),
            default_market: Arc::from(default_market),
        }
    }
}

pub fn spotify_router(state: SpotifyState) -> Router {
    Router::new()
        .route("/token", get(token))
        .route("/search", get(search))
        .route("/genres", get(genres))
        .route("/genres/:genre", get(genre_artists))
        .route("/album/:id", get(album))
        .route("/artist/:id/top-tracks", get(artist_top_tracks))
        .route("/new-releases", get(new_releases))
        .route("/me/recently-played", get(recently_played))
        .route("/me/tracks", get(saved_tracks))
        .route("/me/playlists", get(my_playlists))
        .route("/playlist/:id", get(playlist))
        .route("/playlist/:id/tracks", get(playlist_tracks))
        .route("/recommendations", get(recommendations))
        .route(
            "/personalized-recommendations",
            get(personalized_recommendations),
        )
        .route("/ai-recommendations", get(personalized_recommendations))
        .with_state(state)
}

// ========== Query Types ==========

fn default_limit() -> u32 {
    20
}

fn default_new_releases_limit() -> u32 {
    50
}

/// `limit`/`offset` paging, 20 items from the start by default
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Debug, Deserialize)]
pub struct NewReleasesQuery {
    #[serde(default = "default_new_releases_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub types: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    #[serde(default)]
    pub market: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

// ========== App-token handlers ==========

async fn token(State(state): State<SpotifyState>) -> ApiResult<impl IntoResponse> {
    let access_token = state.spotify_service.app_token().await?;
    Ok(Json(TokenResponse { access_token }))
}

async fn search(
    State(state): State<SpotifyState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let types = query
        .types
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SEARCH_TYPES.to_string());
    let params = SearchParams::new(query.q, types).page(query.limit, query.offset);

    Ok(Json(state.spotify_service.search(&params).await?))
}

async fn genres(State(state): State<SpotifyState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.spotify_service.genres().await?))
}

async fn genre_artists(
    State(state): State<SpotifyState>,
    Path(genre): Path<String>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let body = state
        .spotify_service
        .genre_artists(&genre, page.limit, page.offset)
        .await?;
    Ok(Json(body))
}

async fn album(
    State(state): State<SpotifyState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.spotify_service.album(&id).await?))
}

async fn artist_top_tracks(
    State(state): State<SpotifyState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<MarketQuery>,
) -> ApiResult<impl IntoResponse> {
    let market = query
        .market
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| state.default_market.to_string());

    let body = state
        .spotify_service
        .artist_top_tracks(&id, &market)
        .await?;
    Ok(Json(body))
}

// ========== User-token handlers ==========

async fn new_releases(
    State(state): State<SpotifyState>,
    auth: AuthUser,
    ApiQuery(page): ApiQuery<NewReleasesQuery>,
) -> ApiResult<impl IntoResponse> {
    let body = state
        .spotify_service
        .new_releases(&auth.spotify_token, page.limit, page.offset)
        .await?;
    Ok(Json(body))
}

async fn recently_played(
    State(state): State<SpotifyState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let body = state
        .spotify_service
        .recently_played(&auth.user_id, &auth.spotify_token)
        .await?;
    Ok(Json(body))
}

async fn saved_tracks(
    State(state): State<SpotifyState>,
    auth: AuthUser,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let body = state
        .spotify_service
        .saved_tracks(&auth.spotify_token, page.limit, page.offset)
        .await?;
    Ok(Json(body))
}

async fn my_playlists(
    State(state): State<SpotifyState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state.spotify_service.my_playlists(&auth.spotify_token).await?,
    ))
}

async fn playlist(
    State(state): State<SpotifyState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .spotify_service
            .playlist(&auth.spotify_token, &id)
            .await?,
    ))
}

async fn playlist_tracks(
    State(state): State<SpotifyState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .spotify_service
            .playlist_tracks(&auth.spotify_token, &id)
            .await?,
    ))
}

async fn recommendations(
    State(state): State<SpotifyState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .spotify_service
            .recommendations(&auth.spotify_token)
            .await?,
    ))
}

async fn personalized_recommendations(
    State(state): State<SpotifyState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let recommendations = state
        .recommendation_service
        .personalized(&auth.spotify_token)
        .await?;

    Ok(Json(RecommendationsResponse { recommendations }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let page: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((page.limit, page.offset), (20, 0));

        let page: NewReleasesQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((page.limit, page.offset), (50, 0));
    }

    #[test]
    fn test_search_query_defaults() {
        let query: SearchQuery = serde_json::from_str(r#"{"q": "daft punk"}"#).unwrap();
        assert_eq!(query.q, "daft punk");
        assert!(query.types.is_none());
        assert_eq!(query.limit, 20);
    }
}
