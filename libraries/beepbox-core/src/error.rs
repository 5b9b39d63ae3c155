/// Core error types for BeepBox
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for BeepBox
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Buffer shape or format is unusable
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),
}

impl CoreError {
    /// Create an invalid buffer error
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }
}
