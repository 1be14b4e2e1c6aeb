//! Error handling for the Museboxd API
//!
//! A single error type built with thiserror, mapped to HTTP status codes
//! through Axum's IntoResponse trait. Every error is logged once, at a
//! severity chosen from its status, when it is turned into a response.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use museboxd_gemini_client::GeminiError;
use museboxd_spotify_client::SpotifyError;
use serde::Serialize;
use thiserror::Error;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ========== Authentication & Authorization ==========
    /// Invalid or missing authentication credentials
    #[error("authentication required")]
    Unauthorized,

    /// Invalid token (expired, malformed, revoked session)
    #[error("invalid authentication token: {0}")]
    InvalidToken(String),

    /// Caller does not own the resource
    #[error("forbidden: {0}")]
    Forbidden(String),

    // ========== Resource Errors ==========
    /// Requested resource not found
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    // ========== Validation Errors ==========
    /// Request validation failed
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Invalid request body format
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid query parameter
    #[error("invalid query parameter '{name}': {reason}")]
    InvalidQueryParam { name: &'static str, reason: String },

    // ========== Database Errors ==========
    /// Database query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    // ========== External Service Errors ==========
    /// Spotify answered with a non-success status, mirrored to the caller
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// Spotify could not be reached
    #[error("Spotify service error: {0}")]
    Spotify(String),

    /// Gemini failed; the detail is logged where it is converted
    #[error("AI service unavailable")]
    AiService,

    // ========== Configuration Errors ==========
    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    // ========== Internal Errors ==========
    /// Internal server error (catch-all for unexpected errors)
    #[error("internal server error: {0}")]
    Internal(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// JWT encoding/decoding error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 401 Unauthorized
            Self::Unauthorized | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            Self::NotFound { .. } => StatusCode::NOT_FOUND,

            // 400 Bad Request
            Self::ValidationError(_)
            | Self::InvalidBody(_)
            | Self::MissingField(_)
            | Self::InvalidQueryParam { .. } => StatusCode::BAD_REQUEST,

            // Whatever Spotify said
            Self::Upstream { status, .. } => *status,

            // 502 Bad Gateway (external service errors)
            Self::Spotify(_) | Self::AiService => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::Database(_)
            | Self::Configuration(_)
            | Self::Internal(_)
            | Self::Serialization(_)
            | Self::Jwt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidQueryParam { .. } => "INVALID_QUERY_PARAM",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::Spotify(_) => "SPOTIFY_ERROR",
            Self::AiService => "AI_SERVICE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Jwt(_) => "JWT_ERROR",
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// Mirror an upstream status; unknown codes become 502
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            message: message.into(),
        }
    }

    /// Map a Spotify client failure for the named operation
    ///
    /// Upstream answers keep their status with a `Failed to {operation}`
    /// message; the upstream body is only logged.
    pub fn spotify(operation: &str, err: SpotifyError) -> Self {
        match err {
            SpotifyError::Api { status, message } => {
                tracing::error!(status, upstream_body = %message, "Failed to {}", operation);
                Self::upstream(status, format!("Failed to {}", operation))
            }
            SpotifyError::MissingCredentials => {
                Self::Configuration("Missing Spotify credentials".to_string())
            }
            SpotifyError::InvalidInput(reason) => Self::ValidationError(reason),
            other => Self::Spotify(format!("Failed to {}: {}", operation, other)),
        }
    }

    /// Log the error with appropriate severity based on status code
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Authorization error"
            );
        } else {
            tracing::debug!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Client error"
            );
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let error_response = ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
            details: None,
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api_err) => api_err,
            Err(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<GeminiError> for ApiError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingApiKey => Self::Configuration(err.to_string()),
            other => {
                tracing::error!(error = %other, "Gemini request failed");
                Self::AiService
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::not_found("diary entry", "123").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Forbidden("not yours".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::MissingField("itemId").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::AiService.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_upstream_status_is_mirrored() {
        let err = ApiError::upstream(404, "Failed to fetch album");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Failed to fetch album");

        let err = ApiError::upstream(429, "Failed to fetch search results");
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_upstream_invalid_status_becomes_bad_gateway() {
        let err = ApiError::upstream(42, "weird");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_missing_field_message() {
        assert_eq!(
            ApiError::MissingField("imageUrl").to_string(),
            "Missing required field: imageUrl"
        );
    }

    #[test]
    fn test_anyhow_downcast_keeps_variant() {
        let err: ApiError = anyhow::Error::new(ApiError::Unauthorized).into();
        assert_eq!(err.error_code(), "UNAUTHORIZED");

        let err: ApiError = anyhow::anyhow!("boom").into();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_spotify_api_error_is_mirrored_with_operation() {
        let err = ApiError::spotify(
            "fetch album",
            SpotifyError::Api {
                status: 404,
                message: "non existing id".to_string(),
            },
        );
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Failed to fetch album");
    }

    #[test]
    fn test_spotify_missing_credentials_is_server_error() {
        let err = ApiError::spotify("get token", SpotifyError::MissingCredentials);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("Missing Spotify credentials"));

        let err = ApiError::spotify("search", SpotifyError::Timeout);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_gemini_errors() {
        let err: ApiError = GeminiError::MissingApiKey.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ApiError = GeminiError::Timeout(60).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_gemini_details_stay_out_of_the_response() {
        let err: ApiError = GeminiError::ApiError {
            status: 400,
            message: "API key not valid: secret-key".to_string(),
        }
        .into();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "AI_SERVICE_ERROR");
        assert_eq!(body["message"], "AI service unavailable");
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = ApiError::not_found("diary entry", "abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "diary entry not found: abc");
        assert!(body.get("details").is_none());
    }
}
