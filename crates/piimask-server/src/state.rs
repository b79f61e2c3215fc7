//! Shared application state.

use std::sync::Arc;

use piimask_core::ServiceConfig;
use piimask_detect::Detector;

use crate::api::ApiError;

/// State shared by all route handlers. Immutable after startup.
pub struct AppState {
    pub config: ServiceConfig,
    detector: Option<Arc<dyn Detector>>,
}

impl AppState {
    pub fn new(config: ServiceConfig, detector: Option<Arc<dyn Detector>>) -> Self {
        Self { config, detector }
    }

    /// The configured detector, or 503 when none is available.
    pub fn detector(&self) -> Result<&dyn Detector, ApiError> {
        self.detector
            .as_deref()
            .ok_or_else(|| ApiError::Unavailable("No PII detector configured".into()))
    }
}
