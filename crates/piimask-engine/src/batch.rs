//! Per-text masking and positional batch assembly.

use tracing::{debug, warn};

use crate::error::MaskError;
use crate::resolve::resolve;
use crate::substitute::substitute;
use crate::types::{Detection, MaskConfig, MaskedDocument};

/// Outcome for one batch slot.
pub type SlotResult = Result<MaskedDocument, MaskError>;

/// One batch slot as handed to [`mask_batch`].
#[derive(Debug, Clone)]
pub enum BatchInput {
    Text {
        text: String,
        detections: Vec<Detection>,
    },
    /// The slot could not be read as text; carries the reason.
    Invalid(String),
}

/// Resolve and substitute one text.
pub fn mask_text(
    text: impl Into<String>,
    detections: Vec<Detection>,
    config: &MaskConfig,
) -> MaskedDocument {
    let original_text = text.into();
    let received = detections.len();
    let resolution = resolve(&original_text, detections, config);
    let masked_text = substitute(&original_text, &resolution.resolved, config);

    debug!(
        received,
        resolved = resolution.resolved.len(),
        rejected = resolution.rejected.len(),
        "Masked text"
    );

    MaskedDocument {
        original_text,
        masked_text,
        resolved: resolution.resolved,
        rejected: resolution.rejected,
    }
}

/// Mask every slot independently with one shared config.
///
/// The output always has one entry per input, in input order.
pub fn mask_batch(inputs: Vec<BatchInput>, config: &MaskConfig) -> Vec<SlotResult> {
    let mut slots = BatchSlots::new(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        let result = match input {
            BatchInput::Text { text, detections } => Ok(mask_text(text, detections, config)),
            BatchInput::Invalid(reason) => Err(MaskError::BatchItemFailure { index, reason }),
        };
        slots.fill(index, result);
    }
    slots.finish()
}

/// Fixed-size result table written by slot index.
///
/// Results may arrive in any order; `finish` returns them in slot order.
#[derive(Debug)]
pub struct BatchSlots {
    slots: Vec<Option<SlotResult>>,
}

impl BatchSlots {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| None).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store the result for `index`. Out-of-range indexes are ignored.
    pub fn fill(&mut self, index: usize, result: SlotResult) {
        match self.slots.get_mut(index) {
            Some(slot) => *slot = Some(result),
            None => warn!(index, len = self.slots.len(), "Ignoring result for unknown batch slot"),
        }
    }

    /// Slot results in input order. Slots never filled become failures.
    pub fn finish(self) -> Vec<SlotResult> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    Err(MaskError::BatchItemFailure {
                        index,
                        reason: "slot was not processed".into(),
                    })
                })
            })
            .collect()
    }
}
