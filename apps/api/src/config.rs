//! API server configuration

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use museboxd_shared_config::{
    CommonConfig, DatabaseConfig, Environment, GeminiConfig, SpotifyConfig,
};

/// Minimum required length for JWT_SECRET to be considered secure
const MIN_JWT_SECRET_LENGTH: usize = 32;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with the client crates
    pub common: CommonConfig,

    /// Server port (default: 8080)
    pub port: u16,

    /// Secret used to sign session tokens and derive the token encryption key
    pub jwt_secret: String,

    /// Session lifetime (default: 30d)
    pub session_expiry: String,

    /// CORS allowed origins (optional)
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In production mode, this function requires:
    /// - `JWT_SECRET`: at least 32 characters long
    /// - `DATABASE_URL`: explicitly set
    /// - `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET`
    /// - `GEMINI_API_KEY`
    ///
    /// In development/staging mode, missing upstream credentials only disable
    /// the routes that need them.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        )
        .unwrap_or_default();
        let is_production = environment.is_production();

        let jwt_secret = Self::load_jwt_secret(is_production)?;

        if is_production {
            Self::validate_database_url()?;
        }

        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if is_production {
            Self::validate_upstream_credentials(&common.spotify, &common.gemini)?;
        }

        Ok(Self {
            common,

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT value")?,

            jwt_secret,

            session_expiry: env::var("SESSION_EXPIRY").unwrap_or_else(|_| "30d".to_string()),

            cors_allowed_origins: env::var("CORS_ORIGINS").ok().map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
        })
    }

    /// Load and validate JWT_SECRET
    ///
    /// In production it must be set and at least MIN_JWT_SECRET_LENGTH
    /// characters. In development a fixed default is used with a warning.
    fn load_jwt_secret(is_production: bool) -> Result<String> {
        match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => {
                if is_production && secret.len() < MIN_JWT_SECRET_LENGTH {
                    bail!(
                        "JWT_SECRET must be at least {} characters in production (got {})",
                        MIN_JWT_SECRET_LENGTH,
                        secret.len()
                    );
                }
                Ok(secret)
            }
            _ if is_production => {
                bail!(
                    "JWT_SECRET environment variable is required in production. \
                     Please set a secure secret of at least {} characters.",
                    MIN_JWT_SECRET_LENGTH
                );
            }
            _ => {
                tracing::warn!(
                    "JWT_SECRET not set, using insecure default. \
                     This is only acceptable in development mode."
                );
                Ok("development-secret-change-in-production".to_string())
            }
        }
    }

    /// Validate that DATABASE_URL is explicitly set in production
    fn validate_database_url() -> Result<()> {
        match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => Ok(()),
            _ => {
                bail!(
                    "DATABASE_URL environment variable is required in production. \
                     Please set your PostgreSQL connection string."
                );
            }
        }
    }

    /// Spotify app credentials and the Gemini key are mandatory in production
    fn validate_upstream_credentials(spotify: &SpotifyConfig, gemini: &GeminiConfig) -> Result<()> {
        if !spotify.has_credentials() {
            bail!(
                "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are required in production."
            );
        }
        if !gemini.is_configured() {
            bail!("GEMINI_API_KEY is required in production.");
        }
        Ok(())
    }

    /// Get database configuration
    pub fn database(&self) -> &DatabaseConfig {
        &self.common.database
    }

    /// Get Spotify configuration
    pub fn spotify(&self) -> &SpotifyConfig {
        &self.common.spotify
    }

    /// Get Gemini configuration
    pub fn gemini(&self) -> &GeminiConfig {
        &self.common.gemini
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }
}
