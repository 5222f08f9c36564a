// HTTP API Error Types
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

const INTERNAL_MESSAGE: &str = "An error occurred while processing your request";

/// A single field-level validation problem, visible to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    Validation { message: String, errors: Vec<FieldError> },

    // 401 Unauthorized
    #[error("{0}")]
    Unauthorized(String),

    // 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 409 Conflict
    #[error("{0}")]
    Conflict(String),

    // 500 Internal Server Error; the detail is logged, never returned
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg,
            ApiError::Validation { message, .. } => message,
            ApiError::Internal(_) => INTERNAL_MESSAGE,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation { message, errors } => json!({
                "message": message,
                "errors": errors,
            }),
            _ => json!({ "message": self.message() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        ApiError::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::validation(vec![FieldError::new(field, message)])
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn authentication_required() -> Self {
        ApiError::Unauthorized("Authentication required".to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => ApiError::not_found(msg),
            StorageError::Conflict(msg) => ApiError::conflict(msg),
            StorageError::InvalidReference(msg) => ApiError::bad_request(msg),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => ApiError::unauthorized("Invalid or expired token"),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if let JsonRejection::JsonDataError(err) = &rejection {
            if let Some(field_error) = schema_mismatch(&err.body_text()) {
                return ApiError::validation(vec![field_error]);
            }
        }
        ApiError::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

/// Split a JSON data error into the offending field path and the reason,
/// dropping the trailing line/column position
fn schema_mismatch(detail: &str) -> Option<FieldError> {
    let detail = detail.split_once("target type: ").map_or(detail, |(_, rest)| rest);
    let (path, reason) = detail.split_once(": ")?;
    let is_path = !path.is_empty()
        && path != "."
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    if !is_path {
        return None;
    }
    let reason = reason.rsplit_once(" at line ").map_or(reason, |(head, _)| head);
    Some(FieldError::new(path, reason))
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(format!("Invalid query parameters: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::bad_request(format!("Invalid multipart body: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("Request failed: {}", detail);
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_detail() {
        let err = ApiError::internal("connection refused on 10.0.0.4");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_json(), json!({ "message": INTERNAL_MESSAGE }));
    }

    #[test]
    fn validation_errors_carry_fields() {
        let err = ApiError::invalid_field("name", "This field is required");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_json(),
            json!({
                "message": "Validation failed",
                "errors": [{ "field": "name", "message": "This field is required" }]
            })
        );
    }

    #[test]
    fn json_type_errors_name_the_field() {
        let err = schema_mismatch(
            "Failed to deserialize the JSON body into the target type: jobType: unknown variant `gig`, \
             expected one of `full_time`, `contract` at line 1 column 14",
        )
        .unwrap();
        assert_eq!(err.field, "jobType");
        assert_eq!(err.message, "unknown variant `gig`, expected one of `full_time`, `contract`");

        let err = schema_mismatch(
            "Failed to deserialize the JSON body into the target type: companyId: invalid type: \
             string \"abc\", expected i32 at line 1 column 18",
        )
        .unwrap();
        assert_eq!(err.field, "companyId");
        assert_eq!(err.message, "invalid type: string \"abc\", expected i32");
    }

    #[test]
    fn root_level_json_errors_have_no_field() {
        assert!(schema_mismatch(
            "Failed to deserialize the JSON body into the target type: invalid type: \
             integer `5`, expected struct NewJob at line 1 column 1"
        )
        .is_none());
    }

    #[test]
    fn storage_errors_map_to_statuses() {
        let not_found: ApiError = StorageError::NotFound("Job not found".into()).into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.message(), "Job not found");

        let conflict: ApiError = StorageError::Conflict("duplicate".into()).into();
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let reference: ApiError = StorageError::InvalidReference("bad company".into()).into();
        assert_eq!(reference.status_code(), StatusCode::BAD_REQUEST);
    }
}
