//! Error types for correction pass configuration

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorrectionError>;

#[derive(Error, Debug)]
pub enum CorrectionError {
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CorrectionError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
