//! Shared test utilities for the Museboxd workspace
//!
//! Mock implementations of the upstream services so API and client tests
//! run without network access.
//!
//! # Mock Services
//!
//! - [`MockSpotifyServer`] - accounts service and Web API
//! - [`MockGeminiServer`] - `generateContent` and model metadata
//!
//! # Example
//!
//! ```rust,ignore
//! use museboxd_test_utils::MockSpotifyServer;
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let spotify = MockSpotifyServer::start().await;
//!     spotify.mock_app_token().await;
//!
//!     // Point SpotifyConfig::with_base_url at spotify.url()
//! }
//! ```

mod gemini;
mod spotify;

pub use gemini::MockGeminiServer;
pub use spotify::{track_json, MockSpotifyServer};
