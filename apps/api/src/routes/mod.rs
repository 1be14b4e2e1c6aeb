//! HTTP route handlers for the Museboxd API
//!
//! This module contains all REST endpoint handlers:
//! - Session endpoints
//! - Spotify proxy and AI recommendation endpoints
//! - Diary CRUD endpoints
//! - Friend activity
//! - Health check and status endpoints

pub mod auth;
pub mod diary;
pub mod health;
pub mod museboxd;
pub mod spotify;

pub use auth::{auth_router, AuthState};
pub use diary::{diary_router, DiaryState};
pub use health::{health_router, HealthState};
pub use museboxd::{museboxd_router, MuseboxdState};
pub use spotify::{spotify_router, SpotifyState};
