//! Error types for the analytics engine.

use thiserror::Error;

/// Result type alias for analytics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for analytics operations
#[derive(Debug, Error)]
pub enum Error {
    /// Series is shorter than the structural minimum of the requested method
    #[error("Insufficient data for {method}: need at least {required} points, got {actual}")]
    InsufficientData {
        method: String,
        required: usize,
        actual: usize,
    },

    /// Invalid argument (non-finite value, horizon < 1, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration failed range validation
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// 入力不足エラーを作成
    pub fn insufficient_data(method: impl Into<String>, required: usize, actual: usize) -> Self {
        Error::InsufficientData {
            method: method.into(),
            required,
            actual,
        }
    }

    /// 呼び出し側の入力に起因するエラーかどうか
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InsufficientData { .. } | Error::InvalidArgument(_) | Error::Validation(_)
        )
    }
}
