//! Data model shared by the resolver, substitutor and callers.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::resolve::Rejection;

/// Open, string-keyed PII label such as `first_name` or `email`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PiiType(String);

impl PiiType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PiiType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PiiType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PiiType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for PiiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How one PII type is masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskSpec {
    /// Literal replacement token, e.g. `[!EMAIL!]`.
    pub mask: String,
}

/// Per-request mapping from PII type to mask. Its keys are also the type
/// vocabulary handed to the detector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskConfig {
    entries: BTreeMap<PiiType, MaskSpec>,
}

impl MaskConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, pii_type: impl Into<PiiType>, mask: impl Into<String>) -> Self {
        self.entries
            .insert(pii_type.into(), MaskSpec { mask: mask.into() });
        self
    }

    /// Mask token for a type, if configured.
    pub fn mask_for(&self, pii_type: &str) -> Option<&str> {
        self.entries.get(pii_type).map(|spec| spec.mask.as_str())
    }

    pub fn contains(&self, pii_type: &str) -> bool {
        self.entries.contains_key(pii_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured type names, in key order.
    pub fn pii_types(&self) -> Vec<String> {
        self.entries.keys().map(|t| t.as_str().to_string()).collect()
    }

    /// Structural checks run before any text is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::Empty);
        }
        for (pii_type, spec) in &self.entries {
            if pii_type.as_str().trim().is_empty() {
                return Err(ConfigError::EmptyTypeName);
            }
            if spec.mask.is_empty() {
                return Err(ConfigError::EmptyMask(pii_type.to_string()));
            }
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for MaskConfig
where
    K: Into<PiiType>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |config, (k, v)| config.with(k, v))
    }
}

/// A claim by the detector that `literal` occurs verbatim in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "pii")]
    pub literal: String,
    #[serde(rename = "type")]
    pub pii_type: PiiType,
}

impl Detection {
    pub fn new(literal: impl Into<String>, pii_type: impl Into<PiiType>) -> Self {
        Self {
            literal: literal.into(),
            pii_type: pii_type.into(),
        }
    }
}

/// A detection pinned to a `[start, end)` byte span of the original text.
///
/// Only the resolver creates these; the fields are read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDetection {
    literal: String,
    pii_type: PiiType,
    start: usize,
    end: usize,
}

impl ResolvedDetection {
    pub(crate) fn new(detection: Detection, start: usize) -> Self {
        let end = start + detection.literal.len();
        Self {
            literal: detection.literal,
            pii_type: detection.pii_type,
            start,
            end,
        }
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn pii_type(&self) -> &PiiType {
        &self.pii_type
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Caller-facing `{pii, type}` entry. Offsets stay internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedPii {
    pub pii: String,
    #[serde(rename = "type")]
    pub pii_type: String,
}

impl From<&ResolvedDetection> for DetectedPii {
    fn from(resolved: &ResolvedDetection) -> Self {
        Self {
            pii: resolved.literal.clone(),
            pii_type: resolved.pii_type.to_string(),
        }
    }
}

/// Diagnostic entry for a detection that was dropped instead of masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedPii {
    pub pii: String,
    #[serde(rename = "type")]
    pub pii_type: String,
    pub reason: String,
}

/// Result of masking one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedDocument {
    pub original_text: String,
    pub masked_text: String,
    /// Sorted by `start`, pairwise non-overlapping.
    pub resolved: Vec<ResolvedDetection>,
    /// Dropped detections, in the order they were received.
    pub rejected: Vec<Rejection>,
}

impl MaskedDocument {
    /// `{pii, type}` entries in textual order.
    pub fn detected_pii(&self) -> Vec<DetectedPii> {
        self.resolved.iter().map(DetectedPii::from).collect()
    }

    /// Dropped detections worth reporting back. Unconfigured types are
    /// left out since the caller never asked for them.
    pub fn unresolved(&self) -> Vec<UnresolvedPii> {
        self.rejected
            .iter()
            .filter(|r| !matches!(r.error, crate::MaskError::UnknownPiiType(_)))
            .map(|r| UnresolvedPii {
                pii: r.detection.literal.clone(),
                pii_type: r.detection.pii_type.to_string(),
                reason: r.error.code().to_string(),
            })
            .collect()
    }
}
