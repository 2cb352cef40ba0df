//! Error types for configuration loading

use thiserror::Error;

/// A configuration value failed validation
#[derive(Debug, Error)]
#[error("Invalid configuration field '{field}': {reason}")]
pub struct InvalidConfigError {
    pub field: &'static str,
    pub reason: String,
}

/// General error type for the shared layer
#[derive(Debug, Error)]
pub enum DaoError {
    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DaoError>;
