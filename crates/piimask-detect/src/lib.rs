//! PII detection adapters.
//!
//! A detector turns raw text plus the allowed type vocabulary into
//! position-less `(literal, type)` detections. The OpenAI-compatible
//! detector prompts a chat-completions endpoint and parses the JSON array
//! it answers with; any compatible server (including local ones) works.

pub mod detector;
pub mod error;
pub mod openai;
pub mod parse;
pub mod prompt;

pub use detector::{create_detector, BoxedDetection, Detector, StaticDetector};
pub use error::{DetectError, Result};
pub use openai::OpenAiDetector;
