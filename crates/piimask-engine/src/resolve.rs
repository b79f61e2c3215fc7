//! Span resolution: pin position-less detections to byte spans.
//!
//! Detections are claimed longest literal first (stable on received order),
//! each taking the leftmost exact occurrence that does not touch a range
//! already claimed. The result is reported in textual order.

use std::cmp::Reverse;
use std::ops::Range;

use tracing::{debug, warn};

use crate::error::MaskError;
use crate::types::{Detection, MaskConfig, ResolvedDetection};

/// Disjoint byte ranges already assigned to a detection, kept sorted.
#[derive(Debug, Clone, Default)]
pub struct ClaimedRanges {
    ranges: Vec<Range<usize>>,
}

impl ClaimedRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// The claimed range intersecting `span`, if any.
    pub fn conflict(&self, span: &Range<usize>) -> Option<&Range<usize>> {
        // Ranges are disjoint and sorted, so their ends are sorted too.
        let idx = self.ranges.partition_point(|r| r.end <= span.start);
        self.ranges.get(idx).filter(|r| r.start < span.end)
    }

    /// Claim `span`. Returns false (and claims nothing) on intersection.
    pub fn claim(&mut self, span: Range<usize>) -> bool {
        if span.is_empty() || self.conflict(&span).is_some() {
            return false;
        }
        let idx = self.ranges.partition_point(|r| r.start < span.start);
        self.ranges.insert(idx, span);
        true
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// A detection dropped during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position in the detection list as received.
    pub index: usize,
    pub detection: Detection,
    pub error: MaskError,
}

/// Output of [`resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Sorted by `start`.
    pub resolved: Vec<ResolvedDetection>,
    /// Sorted by received index.
    pub rejected: Vec<Rejection>,
}

/// Assign every valid detection a unique, non-overlapping span of `text`.
///
/// Empty literals or types are `InvalidDetection`, types missing from
/// `config` are `UnknownPiiType`, and literals with no unclaimed exact
/// occurrence are `SpanNotFound`. All three only drop the one detection.
pub fn resolve(text: &str, detections: Vec<Detection>, config: &MaskConfig) -> Resolution {
    let mut rejected = Vec::new();
    let mut candidates = Vec::with_capacity(detections.len());

    for (index, detection) in detections.into_iter().enumerate() {
        let invalid = if detection.literal.is_empty() {
            Some("empty literal")
        } else if detection.pii_type.as_str().is_empty() {
            Some("empty type")
        } else {
            None
        };

        if let Some(reason) = invalid {
            warn!(index, pii_type = %detection.pii_type, "Dropping invalid detection: {}", reason);
            rejected.push(Rejection {
                index,
                detection,
                error: MaskError::InvalidDetection(reason.into()),
            });
            continue;
        }

        if !config.contains(detection.pii_type.as_str()) {
            debug!(index, pii_type = %detection.pii_type, "Dropping detection of unconfigured type");
            let error = MaskError::UnknownPiiType(detection.pii_type.to_string());
            rejected.push(Rejection {
                index,
                detection,
                error,
            });
            continue;
        }

        candidates.push((index, detection));
    }

    // Stable sort: equal lengths keep their received order.
    candidates.sort_by_key(|(_, d)| Reverse(d.literal.len()));

    let mut claimed = ClaimedRanges::new();
    let mut resolved = Vec::with_capacity(candidates.len());

    for (index, detection) in candidates {
        match find_unclaimed(text, &detection.literal, &claimed) {
            Some(start) => {
                claimed.claim(start..start + detection.literal.len());
                resolved.push(ResolvedDetection::new(detection, start));
            }
            None => {
                warn!(
                    index,
                    pii_type = %detection.pii_type,
                    literal_len = detection.literal.len(),
                    "Detected literal has no unclaimed occurrence in text"
                );
                let error = MaskError::SpanNotFound(detection.pii_type.to_string());
                rejected.push(Rejection {
                    index,
                    detection,
                    error,
                });
            }
        }
    }

    resolved.sort_by_key(|r| r.start());
    rejected.sort_by_key(|r| r.index);

    Resolution { resolved, rejected }
}

/// Leftmost exact occurrence of `literal` not intersecting `claimed`.
fn find_unclaimed(text: &str, literal: &str, claimed: &ClaimedRanges) -> Option<usize> {
    let mut from = 0;
    loop {
        let start = from + text.get(from..)?.find(literal)?;
        match claimed.conflict(&(start..start + literal.len())) {
            None => return Some(start),
            // Every start before the conflicting range's end still
            // intersects it, and claimed ends are char boundaries.
            Some(range) => from = range.end,
        }
    }
}
