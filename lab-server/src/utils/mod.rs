//! Utilities
//!
//! - [`logger`] - tracing subscriber setup

pub mod logger;

pub use shared::error::{AppError, AppResult, ErrorCode};
