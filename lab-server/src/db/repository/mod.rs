//! Repository Module
//!
//! Plain async functions over a SQLite connection. Callers pass either a
//! pooled connection or an open transaction (`&mut *tx`), so the registry
//! decides where each atomic unit begins and ends.

pub mod member;
pub mod notification;

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Database(format!("JSON column: {err}"))
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Parse a stored text column into a domain value
pub(crate) fn decode<T>(value: &str, column: &str) -> RepoResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| RepoError::Database(format!("invalid {column} '{value}': {e}")))
}
