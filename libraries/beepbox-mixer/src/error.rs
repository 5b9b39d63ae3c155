//! Error types for marker mixing

use beepbox_core::CoreError;
use thiserror::Error;

/// Result type for mixing operations
pub type Result<T> = std::result::Result<T, MixError>;

/// Errors that can occur while mixing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MixError {
    /// Configuration cannot be used (unknown mode, non-finite level, ...)
    #[error("Invalid mix configuration: {0}")]
    InvalidConfig(String),

    /// Host or marker buffer is unusable
    #[error(transparent)]
    Buffer(#[from] CoreError),
}

impl MixError {
    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
