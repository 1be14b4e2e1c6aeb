//! Spotify Web API client for Museboxd
//!
//! This crate wraps the two Spotify hosts the backend talks to:
//! - the accounts service, for client-credentials app tokens (cached until
//!   shortly before expiry) and user token refreshes
//! - the Web API, for catalog and per-user library endpoints
//!
//! Catalog and library calls are generic over the response type so callers
//! can either forward the raw JSON (`serde_json::Value`) or deserialize into
//! the typed models in [`models`].
//!
//! # Example
//!
//! ```rust,no_run
//! use museboxd_shared_config::SpotifyConfig;
//! use museboxd_spotify_client::SpotifyClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SpotifyClient::new(SpotifyConfig::new("client-id", "client-secret"))?;
//!
//! let token = client.app_token().await?;
//! let album: serde_json::Value = client.album(&token, "4aawyAB9vmqN3uQ7FjRGTy").await?;
//! println!("{}", album["name"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! - `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`: app credentials
//! - `SPOTIFY_API_URL` / `SPOTIFY_ACCOUNTS_URL`: endpoint overrides

mod client;
mod error;
pub mod models;

pub use client::{SearchParams, SpotifyClient};
pub use error::{SpotifyError, SpotifyResult};
pub use models::TokenResponse;
