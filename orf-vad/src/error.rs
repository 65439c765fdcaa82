//! Error types for ghost detection configuration

use thiserror::Error;

/// Result type for VAD operations
pub type Result<T> = std::result::Result<T, VadError>;

/// VAD error types
#[derive(Error, Debug)]
pub enum VadError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VadError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
