//! Registry error taxonomy and its mapping onto API errors

use shared::error::{AppError, ErrorCode};
use shared::models::{ConflictReport, MemberId, MemberStatus, MemberType};
use thiserror::Error;

use crate::db::repository::RepoError;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Caller input rejected before any write
    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("password does not satisfy the complexity policy")]
    WeakPassword,

    #[error("{field} must reference a {expected:?}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: MemberType,
        actual: MemberId,
    },

    #[error("'{status}' is not a valid status for a {}", .member_type.label())]
    StatusNotAllowed {
        member_type: MemberType,
        status: MemberStatus,
    },

    #[error("identity already registered: {}", .0.summary())]
    ConflictDetected(ConflictReport),

    #[error("member {0} not found")]
    NotFound(MemberId),

    #[error("document {document_id} not found for member {member_id}")]
    DocumentNotFound { member_id: MemberId, document_id: i64 },

    #[error("notification {0} not found")]
    NotificationNotFound(i64),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account {0} is disabled")]
    AccountDisabled(MemberId),

    #[error("identifier generation failed: {0}")]
    GenerationFailed(String),

    #[error("uniqueness guard unavailable: {0}")]
    GuardUnavailable(String),

    #[error("member write failed: {0}")]
    WriteFailed(String),

    #[error("member update failed: {0}")]
    UpdateFailed(String),

    #[error("asset store failed: {0}")]
    AssetStoreFailed(String),

    /// Read-side query failure
    #[error("database error: {0}")]
    Database(String),
}

impl RegistryError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Rejected by a caller-side rule (the `ValidationFailed` family)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::WeakPassword
                | Self::TypeMismatch { .. }
                | Self::StatusNotAllowed { .. }
        )
    }

    pub fn conflict_report(&self) -> Option<&ConflictReport> {
        match self {
            Self::ConflictDetected(report) => Some(report),
            _ => None,
        }
    }

    pub(crate) fn from_write(err: RepoError) -> Self {
        Self::WriteFailed(err.to_string())
    }

    pub(crate) fn from_update(err: RepoError) -> Self {
        Self::UpdateFailed(err.to_string())
    }
}

impl From<RepoError> for RegistryError {
    fn from(err: RepoError) -> Self {
        Self::Database(err.to_string())
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation { field, reason } => {
                AppError::validation(format!("{field}: {reason}"))
                    .with_detail("field", field)
                    .with_detail("reason", reason)
            }
            RegistryError::WeakPassword => {
                AppError::new(ErrorCode::PasswordPolicyViolation).with_detail("field", "password")
            }
            RegistryError::TypeMismatch {
                ref field,
                expected,
                actual,
            } => AppError::with_message(ErrorCode::MemberTypeMismatch, err.to_string())
                .with_detail("field", field.clone())
                .with_detail("expected", expected.as_str())
                .with_detail("actual", actual.to_string()),
            RegistryError::StatusNotAllowed {
                member_type,
                status,
            } => AppError::with_message(ErrorCode::MemberStatusInvalid, err.to_string())
                .with_detail("field", "status")
                .with_detail("member_type", member_type.as_str())
                .with_detail("status", status.to_string()),
            RegistryError::ConflictDetected(ref report) => {
                let dimensions: Vec<&str> = report.dimensions().iter().map(|d| d.as_str()).collect();
                let member_ids: Vec<String> =
                    report.member_ids().iter().map(|id| id.to_string()).collect();
                AppError::conflict(err.to_string())
                    .with_detail("dimensions", dimensions)
                    .with_detail("member_ids", member_ids)
            }
            RegistryError::NotFound(id) => {
                AppError::new(ErrorCode::MemberNotFound).with_detail("id", id.to_string())
            }
            RegistryError::DocumentNotFound {
                member_id,
                document_id,
            } => AppError::new(ErrorCode::DocumentNotFound)
                .with_detail("member_id", member_id.to_string())
                .with_detail("document_id", document_id),
            RegistryError::NotificationNotFound(id) => {
                AppError::new(ErrorCode::NotificationNotFound).with_detail("id", id)
            }
            RegistryError::InvalidCredentials => AppError::invalid_credentials(),
            RegistryError::AccountDisabled(_) => AppError::new(ErrorCode::AccountDisabled),
            RegistryError::GenerationFailed(_)
            | RegistryError::GuardUnavailable(_)
            | RegistryError::WriteFailed(_)
            | RegistryError::UpdateFailed(_)
            | RegistryError::AssetStoreFailed(_)
            | RegistryError::Database(_) => {
                let code = match &err {
                    RegistryError::GenerationFailed(_) => ErrorCode::IdGenerationFailed,
                    RegistryError::GuardUnavailable(_) => ErrorCode::ConflictCheckUnavailable,
                    RegistryError::WriteFailed(_) => ErrorCode::MemberWriteFailed,
                    RegistryError::UpdateFailed(_) => ErrorCode::MemberUpdateFailed,
                    RegistryError::AssetStoreFailed(_) => ErrorCode::AssetStoreFailed,
                    _ => ErrorCode::DatabaseError,
                };
                AppError::new(code).with_cause(err.to_string())
            }
        }
    }
}
