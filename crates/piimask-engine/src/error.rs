//! Error types for span resolution and masking.
//!
//! `MaskError` values are per-detection or per-slot outcomes. They are
//! collected next to the successful results and never abort a request.
//! `ConfigError` is structural and rejects the request before resolution.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    /// Malformed detection, e.g. an empty literal or type.
    #[error("invalid detection: {0}")]
    InvalidDetection(String),

    /// The detection's type has no entry in the mask configuration.
    #[error("unknown PII type '{0}'")]
    UnknownPiiType(String),

    /// No unclaimed occurrence of the literal exists in the text.
    #[error("no unclaimed occurrence of a '{0}' literal in the text")]
    SpanNotFound(String),

    /// One text of a batch could not be processed.
    #[error("batch item {index} failed: {reason}")]
    BatchItemFailure { index: usize, reason: String },
}

impl MaskError {
    /// Stable snake_case code used in diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDetection(_) => "invalid_detection",
            Self::UnknownPiiType(_) => "unknown_pii_type",
            Self::SpanNotFound(_) => "span_not_found",
            Self::BatchItemFailure { .. } => "batch_item_failure",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PII configuration cannot be empty")]
    Empty,

    #[error("PII type names cannot be empty")]
    EmptyTypeName,

    #[error("mask for PII type '{0}' cannot be empty")]
    EmptyMask(String),
}
