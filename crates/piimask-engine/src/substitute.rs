//! Rewrite resolved spans with their mask tokens.

use crate::types::{MaskConfig, ResolvedDetection};

/// Build the masked text in a single pass over start-sorted spans.
///
/// Bytes outside the spans are copied verbatim. A span whose type has no
/// mask, or that starts before the previous span ended, is left as is;
/// neither happens for the output of [`crate::resolve`].
pub fn substitute(text: &str, resolved: &[ResolvedDetection], config: &MaskConfig) -> String {
    let capacity = resolved.iter().fold(text.len(), |len, r| {
        match config.mask_for(r.pii_type().as_str()) {
            Some(mask) => len.saturating_sub(r.literal().len()) + mask.len(),
            None => len,
        }
    });

    let mut masked = String::with_capacity(capacity);
    let mut cursor = 0;

    for r in resolved {
        if r.start() < cursor {
            continue;
        }
        let Some(mask) = config.mask_for(r.pii_type().as_str()) else {
            continue;
        };
        masked.push_str(&text[cursor..r.start()]);
        masked.push_str(mask);
        cursor = r.end();
    }
    masked.push_str(&text[cursor..]);

    masked
}
