//! Diary service
//!
//! Validates diary input and enforces that entries are only read or
//! changed by the user who wrote them.

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::diary::{
    CreateDiaryEntryRequest, DiaryEntry, DiaryItemType, NewDiaryEntry, UpdateDiaryEntryRequest,
};
use crate::repositories::DiaryRepository;

const MIN_RATING: f64 = 0.5;
const MAX_RATING: f64 = 5.0;
const MAX_REVIEW_CHARS: usize = 1000;

#[derive(Clone)]
pub struct DiaryService {
    repo: DiaryRepository,
}

impl DiaryService {
    pub fn new(repo: DiaryRepository) -> Self {
        Self { repo }
    }

    /// Validate and store a new entry for `user_id`
    pub async fn create(&self, user_id: &str, request: CreateDiaryEntryRequest) -> ApiResult<Uuid> {
        let entry = validate_create(request)?;
        let id = self.repo.create(user_id, &entry).await?;

        tracing::info!(user_id = %user_id, entry_id = %id, item_id = %entry.item_id, "Diary entry created");
        Ok(id)
    }

    /// The caller's entries, newest first
    pub async fn list(&self, user_id: &str) -> ApiResult<Vec<DiaryEntry>> {
        Ok(self.repo.list_for_user(user_id).await?)
    }

    pub async fn get(&self, user_id: &str, id: Uuid) -> ApiResult<DiaryEntry> {
        self.find_owned(user_id, id).await
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        request: UpdateDiaryEntryRequest,
    ) -> ApiResult<()> {
        self.find_owned(user_id, id).await?;

        let rating = validate_rating(request.rating.ok_or(ApiError::MissingField("rating"))?)?;
        // an omitted review keeps the stored one
        let review = request
            .review
            .map(|review| validate_review(Some(review)))
            .transpose()?;

        if !self.repo.update(id, rating, review.as_deref()).await? {
            return Err(ApiError::not_found("diary entry", id.to_string()));
        }
        Ok(())
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> ApiResult<()> {
        self.find_owned(user_id, id).await?;

        if !self.repo.delete(id).await? {
            return Err(ApiError::not_found("diary entry", id.to_string()));
        }

        tracing::info!(user_id = %user_id, entry_id = %id, "Diary entry deleted");
        Ok(())
    }

    /// 404 when missing, 403 when another user owns it
    async fn find_owned(&self, user_id: &str, id: Uuid) -> ApiResult<DiaryEntry> {
        let entry = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("diary entry", id.to_string()))?;

        if entry.user_id != user_id {
            return Err(ApiError::Forbidden(
                "diary entry belongs to another user".to_string(),
            ));
        }
        Ok(entry)
    }
}

/// Treats empty and whitespace-only strings as missing
fn required(value: Option<String>, field: &'static str) -> ApiResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::MissingField(field)),
    }
}

/// Check a create body, reporting the first missing field in form order
pub fn validate_create(request: CreateDiaryEntryRequest) -> ApiResult<NewDiaryEntry> {
    let item_id = required(request.item_id, "itemId")?;
    let item_type = required(request.item_type, "itemType")?;
    let title = required(request.title, "title")?;
    let artist = required(request.artist, "artist")?;
    let image_url = required(request.image_url, "imageUrl")?;
    let rating = request.rating.ok_or(ApiError::MissingField("rating"))?;

    let item_type: DiaryItemType = item_type.parse().map_err(ApiError::ValidationError)?;

    Ok(NewDiaryEntry {
        item_id,
        item_type,
        title,
        artist,
        image_url,
        rating: validate_rating(rating)?,
        review: validate_review(request.review)?,
    })
}

/// Ratings are half stars between 0.5 and 5
pub fn validate_rating(rating: f64) -> ApiResult<f32> {
    if !rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ApiError::ValidationError(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    if (rating * 2.0).fract() != 0.0 {
        return Err(ApiError::ValidationError(
            "rating must be in steps of 0.5".to_string(),
        ));
    }
    Ok(rating as f32)
}

pub fn validate_review(review: Option<String>) -> ApiResult<String> {
    let review = review.unwrap_or_default();
    if review.chars().count() > MAX_REVIEW_CHARS {
        return Err(ApiError::ValidationError(format!(
            "review must be at most {} characters",
            MAX_REVIEW_CHARS
        )));
    }
    Ok(review)
}
