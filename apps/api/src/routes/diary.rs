//! Diary route handlers
//!
//! All routes require a session. Entries can only be read or changed by
//! the user who created them.
//!
//! - `POST /api/diary` - Create an entry
//! - `GET /api/diary` - List the caller's entries
//! - `GET /api/diary/{id}` - Fetch one entry
//! - `PUT /api/diary/{id}` - Update rating and review (an omitted review is kept)
//! - `DELETE /api/diary/{id}` - Delete an entry

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{ApiJson, AuthUser};
use crate::models::diary::{CreateDiaryEntryRequest, UpdateDiaryEntryRequest};
use crate::services::DiaryService;

#[derive(Clone)]
pub struct DiaryState {
    pub diary_service: Arc<DiaryService>,
}

impl DiaryState {
    pub fn new(diary_service: DiaryService) -> Self {
        Self {
            diary_service: Arc::new(diary_service),
        }
    }
}

pub fn diary_router(state: DiaryState) -> Router {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route(
            "/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

fn parse_entry_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id)
        .map_err(|_| ApiError::ValidationError(format!("invalid diary entry id: {}", id)))
}

async fn create_entry(
    State(state): State<DiaryState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateDiaryEntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = state.diary_service.create(&auth.user_id, request).await?;
    Ok(Json(CreatedResponse { success: true, id }))
}

async fn list_entries(
    State(state): State<DiaryState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let entries = state.diary_service.list(&auth.user_id).await?;
    Ok(Json(entries))
}

async fn get_entry(
    State(state): State<DiaryState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_entry_id(&id)?;
    let entry = state.diary_service.get(&auth.user_id, id).await?;
    Ok(Json(entry))
}

async fn update_entry(
    State(state): State<DiaryState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateDiaryEntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_entry_id(&id)?;
    state.diary_service.update(&auth.user_id, id, request).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn delete_entry(
    State(state): State<DiaryState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_entry_id(&id)?;
    state.diary_service.delete(&auth.user_id, id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
