//! Business logic services for Museboxd
//!
//! This module contains the logic behind the HTTP routes:
//! - Spotify-backed sessions and token encryption
//! - Spotify proxy calls and listening history capture
//! - Diary validation and ownership checks
//! - AI recommendations and the friend activity feed
//! - Health checks

pub mod auth;
pub mod diary;
pub mod encryption;
pub mod friend_activity;
pub mod health;
pub mod recommendations;
pub mod spotify;

pub use auth::{AuthConfig, AuthService, AuthenticatedSession};
pub use diary::DiaryService;
pub use encryption::EncryptionService;
pub use friend_activity::FriendActivityService;
pub use health::HealthService;
pub use recommendations::RecommendationService;
pub use spotify::SpotifyService;
