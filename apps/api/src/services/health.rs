//! Health check service for verifying external dependencies
//!
//! Checks PostgreSQL, the Spotify accounts service and Gemini. Upstreams
//! without credentials are reported as skipped.

use museboxd_gemini_client::GeminiClient;
use museboxd_spotify_client::SpotifyClient;
use serde::Serialize;
use sqlx::PgPool;
use std::time::{Duration, Instant};

/// Status of an individual service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Service is healthy and responding
    Healthy,
    /// Service is unhealthy or unreachable
    Unhealthy,
    /// Service check was skipped (e.g., optional service not configured)
    Skipped,
}

/// Result of a single service health check
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    /// Name of the service
    pub name: &'static str,
    /// Current status
    pub status: ServiceStatus,
    /// Response time in milliseconds (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Additional details about the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServiceHealth {
    /// Create a healthy service result
    pub fn healthy(name: &'static str, response_time: Duration) -> Self {
        Self {
            name,
            status: ServiceStatus::Healthy,
            response_time_ms: Some(response_time.as_millis() as u64),
            error: None,
            details: None,
        }
    }

    /// Create a healthy service result with details
    pub fn healthy_with_details(
        name: &'static str,
        response_time: Duration,
        details: serde_json::Value,
    ) -> Self {
        Self {
            name,
            status: ServiceStatus::Healthy,
            response_time_ms: Some(response_time.as_millis() as u64),
            error: None,
            details: Some(details),
        }
    }

    /// Create an unhealthy service result
    pub fn unhealthy(name: &'static str, error: impl Into<String>) -> Self {
        Self {
            name,
            status: ServiceStatus::Unhealthy,
            response_time_ms: None,
            error: Some(error.into()),
            details: None,
        }
    }

    /// Create an unhealthy service result with response time
    pub fn unhealthy_with_time(
        name: &'static str,
        error: impl Into<String>,
        response_time: Duration,
    ) -> Self {
        Self {
            name,
            status: ServiceStatus::Unhealthy,
            response_time_ms: Some(response_time.as_millis() as u64),
            error: Some(error.into()),
            details: None,
        }
    }

    /// Create a skipped service result (for upstreams not configured)
    pub fn skipped(name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            name,
            status: ServiceStatus::Skipped,
            response_time_ms: None,
            error: None,
            details: Some(serde_json::json!({ "reason": reason.into() })),
        }
    }
}

/// Aggregated health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    /// Overall status (healthy only if all required services are healthy)
    pub status: ServiceStatus,
    /// Individual service health results
    pub services: Vec<ServiceHealth>,
    /// Total time to complete all health checks
    pub total_time_ms: u64,
    /// API version
    pub version: &'static str,
}

impl HealthCheckResponse {
    /// Create a new health check response from individual service results
    pub fn new(services: Vec<ServiceHealth>, total_time: Duration) -> Self {
        let status = if services
            .iter()
            .all(|s| s.status == ServiceStatus::Healthy || s.status == ServiceStatus::Skipped)
        {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        };

        Self {
            status,
            services,
            total_time_ms: total_time.as_millis() as u64,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Check if overall health is good
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

/// Health check service for verifying external dependencies
#[derive(Clone)]
pub struct HealthService {
    pool: PgPool,
    spotify: SpotifyClient,
    gemini: GeminiClient,
}

impl HealthService {
    /// Create a new health service
    pub fn new(pool: PgPool, spotify: SpotifyClient, gemini: GeminiClient) -> Self {
        Self {
            pool,
            spotify,
            gemini,
        }
    }

    /// Check PostgreSQL connectivity
    pub async fn check_database(&self) -> ServiceHealth {
        let start = Instant::now();

        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => {
                let elapsed = start.elapsed();
                let version = sqlx::query_scalar::<_, String>("SELECT version()")
                    .fetch_optional(&self.pool)
                    .await
                    .ok()
                    .flatten();

                match version {
                    Some(v) => ServiceHealth::healthy_with_details(
                        "database",
                        elapsed,
                        serde_json::json!({ "version": v }),
                    ),
                    None => ServiceHealth::healthy("database", elapsed),
                }
            }
            Err(e) => ServiceHealth::unhealthy_with_time(
                "database",
                format!("Query failed: {}", e),
                start.elapsed(),
            ),
        }
    }

    /// Check that the accounts service issues a client-credentials token
    pub async fn check_spotify(&self) -> ServiceHealth {
        if !self.spotify.config().has_credentials() {
            return ServiceHealth::skipped("spotify", "Spotify credentials not configured");
        }

        let start = Instant::now();
        match self.spotify.app_token().await {
            Ok(_) => ServiceHealth::healthy("spotify", start.elapsed()),
            Err(e) => ServiceHealth::unhealthy_with_time(
                "spotify",
                format!("Token request failed: {}", e),
                start.elapsed(),
            ),
        }
    }

    /// Check that Gemini accepts the key and knows the configured model
    pub async fn check_gemini(&self) -> ServiceHealth {
        let config = self.gemini.config();
        if !config.is_configured() {
            return ServiceHealth::skipped("gemini", "GEMINI_API_KEY not set");
        }

        let start = Instant::now();
        let details = serde_json::json!({ "model": config.model });
        match self.gemini.health_check().await {
            Ok(true) => ServiceHealth::healthy_with_details("gemini", start.elapsed(), details),
            Ok(false) => ServiceHealth::unhealthy_with_time(
                "gemini",
                format!("Model '{}' unavailable", config.model),
                start.elapsed(),
            ),
            Err(e) => ServiceHealth::unhealthy("gemini", format!("Request failed: {}", e)),
        }
    }

    /// Run all health checks in parallel
    pub async fn check_all(&self) -> HealthCheckResponse {
        let start = Instant::now();

        let (db_health, spotify_health, gemini_health) = tokio::join!(
            self.check_database(),
            self.check_spotify(),
            self.check_gemini(),
        );

        HealthCheckResponse::new(
            vec![db_health, spotify_health, gemini_health],
            start.elapsed(),
        )
    }
}
