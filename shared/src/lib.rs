//! Shared types for the lab membership platform
//!
//! Common types used by the server crate and its clients: the unified
//! error system, API response envelope, and the member registry models.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
