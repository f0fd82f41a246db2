use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use super::models::ErrorResponse;
use crate::config::ValidationError;
use crate::profiles::ProfileError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("payload invalid: {0}")]
    InvalidPayload(String),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Rejected(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Rejected(_) => "REJECTED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(json!(body))).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}

impl From<ProfileError> for ApiError {
    fn from(value: ProfileError) -> Self {
        match value {
            ProfileError::NotFound { .. } => ApiError::NotFound(value.to_string()),
            ProfileError::DefaultCount { .. } => ApiError::InvalidPayload(value.to_string()),
            ProfileError::DuplicateId { .. }
            | ProfileError::CannotRemoveDefault { .. }
            | ProfileError::CannotRemoveActive { .. } => ApiError::Rejected(value.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_errors_map_to_status() {
        let cases = [
            (ProfileError::NotFound { id: "x".into() }, StatusCode::NOT_FOUND),
            (ProfileError::DuplicateId { id: "x".into() }, StatusCode::CONFLICT),
            (
                ProfileError::CannotRemoveDefault { id: "x".into() },
                StatusCode::CONFLICT,
            ),
            (
                ProfileError::CannotRemoveActive { id: "x".into() },
                StatusCode::CONFLICT,
            ),
            (ProfileError::DefaultCount { count: 2 }, StatusCode::BAD_REQUEST),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = ApiError::from(ValidationError::EmptyPattern);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_PAYLOAD");
    }
}
