//! Errors raised while talking to a detection backend.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Detection request timed out after {0}s")]
    Timeout(u64),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid detector response: {0}")]
    Parse(String),

    #[error("Detector configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DetectError>;
