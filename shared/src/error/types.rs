//! Error type and its JSON body

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// Every API handler returns this. `cause` is the internal reason behind a
/// system failure; it is logged once when the error becomes a response and
/// never reaches the client.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    /// Client-facing message
    pub message: String,
    /// Field-level context (conflicting dimensions, offending field)
    pub details: Option<HashMap<String, Value>>,
    pub cause: Option<String>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            cause: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::MemberIdentityConflict, msg)
    }
}

/// JSON body of an error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        if self.code.category() == ErrorCategory::System {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                cause = self.cause.as_deref().unwrap_or("-"),
                "System error occurred"
            );
        }

        (self.http_status(), Json(ErrorResponse::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::MemberNotFound);
        assert_eq!(err.code, ErrorCode::MemberNotFound);
        assert_eq!(err.message, "Member not found");
        assert!(err.details.is_none());
        assert!(err.cause.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required fields")
            .with_detail("field", "primary_email")
            .with_detail("reason", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "primary_email");
        assert_eq!(details.get("reason").unwrap(), "required");
    }

    #[test]
    fn test_app_error_http_status() {
        assert_eq!(
            AppError::new(ErrorCode::MemberNotFound).http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::conflict("phone taken").http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::invalid_credentials().http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::invalid_request("Bad base64").http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_response_body() {
        let err = AppError::conflict("Phone already registered")
            .with_detail("dimensions", serde_json::json!(["phone"]));
        let body = ErrorResponse::from(&err);

        assert_eq!(body.code, 8002);
        assert_eq!(body.message, "Phone already registered");
        assert!(body.details.is_some());
    }

    #[test]
    fn test_cause_is_not_serialized() {
        let err = AppError::new(ErrorCode::MemberWriteFailed)
            .with_cause("no such table: phd_candidates_social_links");
        let json = serde_json::to_string(&ErrorResponse::from(&err)).unwrap();
        assert!(json.contains("\"code\":9303"));
        assert!(!json.contains("phd_candidates_social_links"));
        assert!(!json.contains("details"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
