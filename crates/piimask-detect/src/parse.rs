//! Parse model output into detections.
//!
//! Models wrap JSON in Markdown fences often enough that the first fenced
//! block, when present, is taken as the payload.

use once_cell::sync::Lazy;
use piimask_engine::Detection;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{DetectError, Result};

static FENCED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").unwrap());

/// JSON text inside the first fenced block, or the whole response trimmed.
pub fn json_payload(raw: &str) -> &str {
    FENCED_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| raw.trim())
}

/// Parse a model response into detections.
///
/// Accepts a bare array or an object wrapping one under `detections` or
/// `pii`. Entries that are not `{pii, type}` objects are kept with empty
/// fields so the resolver reports them as invalid instead of failing the
/// whole response.
pub fn parse_detections(raw: &str) -> Result<Vec<Detection>> {
    let payload = json_payload(raw);
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| DetectError::Parse(format!("Invalid JSON response: {}", e)))?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map
            .remove("detections")
            .or_else(|| map.remove("pii"))
        {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(DetectError::Parse(
                    "expected a JSON array of detections".into(),
                ))
            }
        },
        _ => {
            return Err(DetectError::Parse(
                "expected a JSON array of detections".into(),
            ))
        }
    };

    let detections: Vec<Detection> = entries.iter().map(entry_to_detection).collect();
    debug!("Parsed {} detections from model response", detections.len());
    Ok(detections)
}

fn entry_to_detection(entry: &Value) -> Detection {
    let field = |key: &str| match entry.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    Detection::new(field("pii"), field("type"))
}
