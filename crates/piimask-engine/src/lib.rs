//! Span resolution and substitution for detected PII.
//!
//! Detections arrive as `(literal, type)` pairs with no position data.
//! The resolver places each one on a unique, non-overlapping byte span of
//! the original text (longest literals first), the substitutor rewrites
//! those spans with the configured mask tokens, and the batch helpers keep
//! per-text results correlated with their input slot.

pub mod batch;
pub mod error;
pub mod resolve;
pub mod substitute;
pub mod types;

pub use batch::{mask_batch, mask_text, BatchInput, BatchSlots, SlotResult};
pub use error::{ConfigError, MaskError};
pub use resolve::{resolve, ClaimedRanges, Rejection, Resolution};
pub use substitute::substitute;
pub use types::{
    DetectedPii, Detection, MaskConfig, MaskSpec, MaskedDocument, PiiType, ResolvedDetection,
    UnresolvedPii,
};
