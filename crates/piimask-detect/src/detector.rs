//! The detector seam and its simple implementations.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use piimask_core::config::{LlmSettings, DEFAULT_BASE_URL};
use piimask_engine::Detection;
use tracing::{info, warn};

use crate::error::{DetectError, Result};
use crate::openai::OpenAiDetector;

/// Boxed future returned by [`Detector::detect`].
pub type BoxedDetection<'a> = Pin<Box<dyn Future<Output = Result<Vec<Detection>>> + Send + 'a>>;

/// Anything that can find `(literal, type)` PII claims in a text.
///
/// Output carries no positions and may be unordered, duplicated, or
/// include types outside `pii_types`.
pub trait Detector: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    fn detect<'a>(&'a self, text: &'a str, pii_types: &'a [String]) -> BoxedDetection<'a>;
}

/// Detector answering from a fixed table keyed by exact text.
///
/// Texts not in the table yield no detections; texts registered with
/// [`StaticDetector::failing_on`] yield an error.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    responses: HashMap<String, Vec<Detection>>,
    failures: HashSet<String>,
}

impl StaticDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: impl Into<String>, detections: Vec<Detection>) -> Self {
        self.responses.insert(text.into(), detections);
        self
    }

    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.failures.insert(text.into());
        self
    }
}

impl Detector for StaticDetector {
    fn name(&self) -> &str {
        "static"
    }

    fn detect<'a>(&'a self, text: &'a str, _pii_types: &'a [String]) -> BoxedDetection<'a> {
        Box::pin(async move {
            if self.failures.contains(text) {
                return Err(DetectError::Request("static detector failure".into()));
            }
            Ok(self.responses.get(text).cloned().unwrap_or_default())
        })
    }
}

/// Build the configured LLM detector.
///
/// Needs an API key unless a non-default base URL points at a server that
/// may not require one. Returns `None` when detection is unavailable.
pub fn create_detector(settings: &LlmSettings) -> Option<Arc<dyn Detector>> {
    if settings.api_key.is_none() && settings.base_url == DEFAULT_BASE_URL {
        info!("OPENAI_API_KEY not set. PII detection is unavailable.");
        return None;
    }

    match OpenAiDetector::new(settings) {
        Ok(detector) => {
            info!(
                "Using OpenAI-compatible detector at {} (model={})",
                settings.base_url, settings.model
            );
            Some(Arc::new(detector))
        }
        Err(e) => {
            warn!("Detector unavailable: {}", e);
            None
        }
    }
}
