//! Body and query extractors that reject with `ApiError`
//!
//! axum's own `Json` and `Query` answer malformed input with plain-text
//! 415/422 responses. These wrappers route the rejection through
//! `ApiError` so every failure carries the `{ code, message }` body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body; malformed bodies are 400 `INVALID_BODY`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string; unparseable parameters are 400 `VALIDATION_ERROR`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
