use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use museboxd_api::{build_app, repositories::SessionRepository, Config};

/// Expired sessions removed per startup sweep
const EXPIRED_SESSION_BATCH: i64 = 1000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "museboxd_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!(
        environment = %config.common.environment,
        "Starting Museboxd API server on port {}",
        config.port
    );
    if !config.spotify().has_credentials() {
        tracing::warn!("Spotify app credentials not set, catalog routes will fail");
    }
    if !config.gemini().is_configured() {
        tracing::warn!("GEMINI_API_KEY not set, AI recommendations will fail");
    }

    tracing::info!("Connecting to database...");
    let database = config.database();
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .acquire_timeout(Duration::from_secs(database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(database.idle_timeout_secs))
        .connect(&database.url)
        .await?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations completed successfully");

    match SessionRepository::new(pool.clone())
        .delete_expired(EXPIRED_SESSION_BATCH)
        .await
    {
        Ok(removed) if removed > 0 => tracing::info!(removed, "Removed expired sessions"),
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to remove expired sessions"),
    }

    let app = build_app(pool, &config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
