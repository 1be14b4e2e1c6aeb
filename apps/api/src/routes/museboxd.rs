//! Museboxd social route handlers
//!
//! - `GET /api/museboxd/friend-activity` - What other recent users played last

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::services::FriendActivityService;

#[derive(Clone)]
pub struct MuseboxdState {
    pub friend_activity_service: Arc<FriendActivityService>,
}

impl MuseboxdState {
    pub fn new(friend_activity_service: FriendActivityService) -> Self {
        Self {
            friend_activity_service: Arc::new(friend_activity_service),
        }
    }
}

pub fn museboxd_router(state: MuseboxdState) -> Router {
    Router::new()
        .route("/friend-activity", get(friend_activity))
        .with_state(state)
}

async fn friend_activity(
    State(state): State<MuseboxdState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let feed = state
        .friend_activity_service
        .feed(&auth.user_id)
        .await?;
    Ok(Json(feed))
}
