//! Request/response bodies and the HTTP error type.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use piimask_core::UnresolvedPolicy;
use piimask_detect::DetectError;
use piimask_engine::{ConfigError, DetectedPii, MaskConfig, MaskedDocument, SlotResult, UnresolvedPii};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------
// Requests
// ---------------------------------------------------------------

/// `POST /mask-pii`
#[derive(Debug, Clone, Deserialize)]
pub struct MaskRequest {
    pub text: String,
    pub pii_config: MaskConfig,
}

/// `POST /mask-pii/batch`
///
/// Texts stay untyped so one bad slot does not reject the whole request.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchMaskRequest {
    pub texts: Vec<Value>,
    pub pii_config: MaskConfig,
}

// ---------------------------------------------------------------
// Responses
// ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskResponse {
    pub original_text: String,
    pub masked_text: String,
    pub detected_pii: Vec<DetectedPii>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<Vec<UnresolvedPii>>,
}

impl MaskResponse {
    pub fn from_document(doc: MaskedDocument, policy: UnresolvedPolicy) -> Self {
        let unresolved = (policy == UnresolvedPolicy::Report).then(|| doc.unresolved());
        Self {
            detected_pii: doc.detected_pii(),
            original_text: doc.original_text,
            masked_text: doc.masked_text,
            unresolved,
        }
    }
}

/// A batch slot that produced no masked text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotError {
    pub index: usize,
    pub code: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMaskResponse {
    pub original_texts: Vec<Value>,
    /// `null` for failed slots.
    pub masked_texts: Vec<Option<String>>,
    pub detected_pii: Vec<Vec<DetectedPii>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SlotError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<Vec<Vec<UnresolvedPii>>>,
}

impl BatchMaskResponse {
    /// Assemble the response; `slots[i]` must belong to `texts[i]`.
    pub fn from_slots(texts: Vec<Value>, slots: Vec<SlotResult>, policy: UnresolvedPolicy) -> Self {
        let mut masked_texts = Vec::with_capacity(slots.len());
        let mut detected_pii = Vec::with_capacity(slots.len());
        let mut unresolved = Vec::with_capacity(slots.len());
        let mut errors = Vec::new();

        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Ok(doc) => {
                    detected_pii.push(doc.detected_pii());
                    unresolved.push(doc.unresolved());
                    masked_texts.push(Some(doc.masked_text));
                }
                Err(e) => {
                    masked_texts.push(None);
                    detected_pii.push(Vec::new());
                    unresolved.push(Vec::new());
                    errors.push(SlotError {
                        index,
                        code: e.code().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Self {
            original_texts: texts,
            masked_texts,
            detected_pii,
            errors,
            unresolved: (policy == UnresolvedPolicy::Report).then_some(unresolved),
        }
    }
}

// ---------------------------------------------------------------
// Errors
// ---------------------------------------------------------------

/// Whole-request failure, rendered as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Rejected(JsonRejection),
    Unavailable(String),
    BadGateway(String),
    GatewayTimeout(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Rejected(rejection) => rejection.status(),
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::BadRequest(msg)
            | Self::Unavailable(msg)
            | Self::BadGateway(msg)
            | Self::GatewayTimeout(msg) => msg.clone(),
            Self::Rejected(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(serde_json::json!({ "detail": self.detail() }))).into_response()
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<DetectError> for ApiError {
    fn from(e: DetectError) -> Self {
        match e {
            DetectError::Timeout(_) => Self::GatewayTimeout(format!("PII detection failed: {}", e)),
            other => Self::BadGateway(format!("PII detection failed: {}", other)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected(rejection)
    }
}
