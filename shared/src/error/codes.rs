//! Unified error codes for the lab membership platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 8xxx: Member registry errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 8xxx: Member ====================
    /// Member not found
    MemberNotFound = 8001,
    /// Identity field already held by another member
    MemberIdentityConflict = 8002,
    /// Identifier does not belong to the expected member type
    MemberTypeMismatch = 8003,
    /// Status is not part of the member type's vocabulary
    MemberStatusInvalid = 8004,
    /// Password does not satisfy the complexity policy
    PasswordPolicyViolation = 8005,
    /// Document not found
    DocumentNotFound = 8101,
    /// Notification not found
    NotificationNotFound = 8201,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Member identifier could not be issued
    IdGenerationFailed = 9301,
    /// Uniqueness check could not be completed
    ConflictCheckUnavailable = 9302,
    /// Member creation failed and was rolled back
    MemberWriteFailed = 9303,
    /// Member update failed and was rolled back
    MemberUpdateFailed = 9304,
    /// Uploaded asset could not be stored
    AssetStoreFailed = 9401,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Member
            ErrorCode::MemberNotFound => "Member not found",
            ErrorCode::MemberIdentityConflict => "Identity is already registered to another member",
            ErrorCode::MemberTypeMismatch => "Member identifier does not match the member type",
            ErrorCode::MemberStatusInvalid => "Status is not allowed for this member type",
            ErrorCode::PasswordPolicyViolation => {
                "Password must be at least 8 characters with upper and lower case letters, a digit and a symbol"
            }
            ErrorCode::DocumentNotFound => "Document not found",
            ErrorCode::NotificationNotFound => "Notification not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::IdGenerationFailed => "Failed to issue member identifier",
            ErrorCode::ConflictCheckUnavailable => "Unable to verify identity uniqueness",
            ErrorCode::MemberWriteFailed => "Failed to create member",
            ErrorCode::MemberUpdateFailed => "Failed to update member",
            ErrorCode::AssetStoreFailed => "Failed to store uploaded file",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1002 => Ok(ErrorCode::InvalidCredentials),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Member
            8001 => Ok(ErrorCode::MemberNotFound),
            8002 => Ok(ErrorCode::MemberIdentityConflict),
            8003 => Ok(ErrorCode::MemberTypeMismatch),
            8004 => Ok(ErrorCode::MemberStatusInvalid),
            8005 => Ok(ErrorCode::PasswordPolicyViolation),
            8101 => Ok(ErrorCode::DocumentNotFound),
            8201 => Ok(ErrorCode::NotificationNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9301 => Ok(ErrorCode::IdGenerationFailed),
            9302 => Ok(ErrorCode::ConflictCheckUnavailable),
            9303 => Ok(ErrorCode::MemberWriteFailed),
            9304 => Ok(ErrorCode::MemberUpdateFailed),
            9401 => Ok(ErrorCode::AssetStoreFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::InvalidRequest.code(), 5);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::MemberNotFound.code(), 8001);
        assert_eq!(ErrorCode::MemberIdentityConflict.code(), 8002);
        assert_eq!(ErrorCode::DocumentNotFound.code(), 8101);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::MemberWriteFailed.code(), 9303);
        assert_eq!(ErrorCode::AssetStoreFailed.code(), 9401);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(2), Ok(ErrorCode::ValidationFailed));
        assert_eq!(ErrorCode::try_from(8002), Ok(ErrorCode::MemberIdentityConflict));
        assert_eq!(ErrorCode::try_from(9302), Ok(ErrorCode::ConflictCheckUnavailable));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(ErrorCode::try_from(4001), Err(InvalidErrorCode(4001)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::MemberIdentityConflict).unwrap();
        assert_eq!(json, "8002");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("9304").unwrap();
        assert_eq!(code, ErrorCode::MemberUpdateFailed);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::MemberNotFound.to_string(), "8001");
    }

    #[test]
    fn test_invalid_error_code_display() {
        assert_eq!(InvalidErrorCode(7).to_string(), "invalid error code: 7");
    }
}
