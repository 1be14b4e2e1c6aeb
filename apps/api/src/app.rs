//! Application assembly
//!
//! Wires repositories, services and routers into the HTTP application so
//! the binary and the integration tests serve the same router.

use axum::{
    extract::Extension,
    http::{header, Method},
    routing::get,
    Router,
};
use museboxd_gemini_client::GeminiClient;
use museboxd_spotify_client::SpotifyClient;
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::repositories::{
    DiaryRepository, ListeningHistoryRepository, SessionRepository, UserRepository,
};
use crate::routes::{
    auth_router, diary_router, health_router, museboxd_router, spotify_router, AuthState,
    DiaryState, HealthState, MuseboxdState, SpotifyState,
};
use crate::services::{
    AuthConfig, AuthService, DiaryService, EncryptionService, FriendActivityService,
    HealthService, RecommendationService, SpotifyService,
};

/// Build the full application router
///
/// Routes:
/// - `/health`, `/health/live`, `/health/ready`
/// - `/auth/session`, `/auth/logout`
/// - `/api/diary/...`
/// - `/api/spotify/...`
/// - `/api/museboxd/friend-activity`
pub fn build_app(pool: PgPool, config: &Config) -> anyhow::Result<Router> {
    let spotify = SpotifyClient::new(config.spotify().clone())?;
    let gemini = GeminiClient::new(config.gemini())?;

    let user_repo = UserRepository::new(pool.clone());
    let session_repo = SessionRepository::new(pool.clone());
    let diary_repo = DiaryRepository::new(pool.clone());
    let history_repo = ListeningHistoryRepository::new(pool.clone());

    let encryption = EncryptionService::new(&config.jwt_secret)?;
    let auth_config =
        AuthConfig::with_expiry_string(config.jwt_secret.clone(), &config.session_expiry);
    let auth_service = AuthService::new(
        auth_config,
        user_repo.clone(),
        session_repo,
        spotify.clone(),
        encryption,
    );

    let health_state = HealthState::new(HealthService::new(
        pool,
        spotify.clone(),
        gemini.clone(),
    ));
    let auth_state = AuthState::new(auth_service.clone());
    let diary_state = DiaryState::new(DiaryService::new(diary_repo));
    let spotify_state = SpotifyState::new(
        SpotifyService::new(spotify.clone(), user_repo, history_repo.clone()),
        RecommendationService::new(spotify, gemini),
        &config.spotify().default_market,
    );
    let museboxd_state = MuseboxdState::new(FriendActivityService::new(history_repo));

    let app = Router::new()
        .route("/", get(root))
        .nest("/health", health_router(health_state))
        .nest("/auth", auth_router(auth_state))
        .nest("/api/diary", diary_router(diary_state))
        .nest("/api/spotify", spotify_router(spotify_state))
        .nest("/api/museboxd", museboxd_router(museboxd_state))
        // AuthUser reads the service from request extensions
        .layer(Extension(auth_service))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config));

    Ok(app)
}

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ORIGINS` is set, only those origins are allowed
/// - If `CORS_ORIGINS` is not set, CORS requests are rejected
///
/// In development mode:
/// - If `CORS_ORIGINS` is set, those origins are used
/// - If `CORS_ORIGINS` is not set, permissive CORS is used
pub fn build_cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                return CorsLayer::new();
            }

            tracing::info!(
                "CORS configured with {} allowed origin(s): {:?}",
                allowed_origins.len(),
                origins
            );
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::ORIGIN,
                ])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        }
        _ if config.is_production() => {
            tracing::warn!(
                "CORS_ORIGINS not configured in production mode. \
                 CORS requests will be rejected. Set CORS_ORIGINS to allow the frontend."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!(
                "Using permissive CORS in development mode. \
                 Set CORS_ORIGINS for production-like behavior."
            );
            CorsLayer::permissive()
        }
    }
}

async fn root() -> &'static str {
    "Museboxd API"
}
