use shared::error::AppError;
use thiserror::Error;

/// Startup and serving failures
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("startup failed: {0}")]
    Startup(#[from] AppError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
