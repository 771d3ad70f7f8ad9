//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::MemberNotFound | Self::DocumentNotFound | Self::NotificationNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            Self::MemberIdentityConflict => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::InvalidCredentials | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 503 Service Unavailable (transient, client can retry)
            Self::ConflictCheckUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::IdGenerationFailed
            | Self::MemberWriteFailed
            | Self::MemberUpdateFailed
            | Self::AssetStoreFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::MemberTypeMismatch
            | Self::MemberStatusInvalid
            | Self::PasswordPolicyViolation => StatusCode::BAD_REQUEST,
        }
    }
}
