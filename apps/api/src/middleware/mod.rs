//! Middleware components for the Museboxd API
//!
//! Provides the `AuthUser` extractor: a verified session plus the user's
//! Spotify access token, or a 401 rejection. `ApiJson` and `ApiQuery`
//! report malformed input as `ApiError` bodies.

pub mod auth;
pub mod extract;

pub use auth::{AuthRejection, AuthUser};
pub use extract::{ApiJson, ApiQuery};
