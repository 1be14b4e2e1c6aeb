//! Shared SQL column lists
//!
//! Each constant is the SELECT/RETURNING column list for one model, kept
//! in the same order as the struct fields it maps to.

/// SQL columns for user queries
pub const USER_COLUMNS: &str = r#"
    id, display_name, email, image_url,
    last_activity_at, created_at, updated_at
"#;

/// SQL columns for session queries
pub const SESSION_COLUMNS: &str = r#"
    id, user_id,
    spotify_access_token, spotify_refresh_token, spotify_token_expires_at,
    is_active, expires_at, created_at, last_active_at
"#;

/// SQL columns for diary entry queries
pub const DIARY_ENTRY_COLUMNS: &str = r#"
    id, user_id, item_id, item_type,
    title, artist, image_url,
    rating, review, created_at, updated_at
"#;
