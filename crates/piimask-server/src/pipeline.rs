//! Detection followed by resolution and substitution, per text or batch.

use futures::stream::{self, StreamExt};
use piimask_detect::{DetectError, Detector};
use piimask_engine::{mask_text, BatchSlots, MaskConfig, MaskError, MaskedDocument, SlotResult};
use serde_json::Value;
use tracing::{error, warn};

/// Detect and mask one text. Detector failures are returned as-is.
pub async fn mask_single(
    detector: &dyn Detector,
    text: &str,
    config: &MaskConfig,
) -> Result<MaskedDocument, DetectError> {
    let detections = detector.detect(text, &config.pii_types()).await?;
    Ok(mask_text(text, detections, config))
}

/// Detect and mask every slot of a batch.
///
/// Up to `concurrency` detection calls run at once. Each finished slot is
/// written by its index, so the output lines up with `texts` no matter
/// which call completes first. Unreadable slots and detector failures
/// become `BatchItemFailure` for that slot only.
pub async fn mask_many(
    detector: &dyn Detector,
    texts: &[Value],
    config: &MaskConfig,
    concurrency: usize,
) -> Vec<SlotResult> {
    let pii_types = config.pii_types();
    let mut slots = BatchSlots::new(texts.len());
    let mut pending = Vec::with_capacity(texts.len());

    for (index, value) in texts.iter().enumerate() {
        match slot_text(value) {
            Ok(text) => pending.push((index, text)),
            Err(reason) => {
                warn!(index, "Skipping batch slot: {}", reason);
                slots.fill(
                    index,
                    Err(MaskError::BatchItemFailure {
                        index,
                        reason: reason.into(),
                    }),
                );
            }
        }
    }

    let pii_types = pii_types.as_slice();
    let calls: Vec<_> = pending
        .into_iter()
        .map(|(index, text)| detect_slot(detector, index, text, pii_types))
        .collect();
    let mut completed = stream::iter(calls).buffer_unordered(concurrency.max(1));

    while let Some((index, text, outcome)) = completed.next().await {
        let result = match outcome {
            Ok(detections) => Ok(mask_text(text, detections, config)),
            Err(e) => {
                error!(index, detector = detector.name(), "Detection failed: {}", e);
                Err(MaskError::BatchItemFailure {
                    index,
                    reason: format!("PII detection failed: {}", e),
                })
            }
        };
        slots.fill(index, result);
    }

    slots.finish()
}

async fn detect_slot<'a>(
    detector: &'a dyn Detector,
    index: usize,
    text: &'a str,
    pii_types: &'a [String],
) -> (usize, &'a str, Result<Vec<piimask_engine::Detection>, DetectError>) {
    (index, text, detector.detect(text, pii_types).await)
}

/// The text of a batch slot, or why it cannot be processed.
pub fn slot_text(value: &Value) -> Result<&str, &'static str> {
    match value {
        Value::String(text) if text.trim().is_empty() => {
            Err("text cannot be empty or whitespace only")
        }
        Value::String(text) => Ok(text.as_str()),
        Value::Null => Err("text is missing"),
        _ => Err("text must be a string"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piimask_detect::StaticDetector;
    use piimask_engine::Detection;
    use serde_json::json;

    fn config() -> MaskConfig {
        MaskConfig::new().with("email", "[EMAIL]")
    }

    #[test]
    fn test_slot_text() {
        assert_eq!(slot_text(&json!("hi")), Ok("hi"));
        assert!(slot_text(&json!("  ")).is_err());
        assert_eq!(slot_text(&Value::Null), Err("text is missing"));
        assert_eq!(slot_text(&json!(123)), Err("text must be a string"));
    }

    #[tokio::test]
    async fn test_mask_single() {
        let detector = StaticDetector::new().with(
            "Hi alice@example.com",
            vec![Detection::new("alice@example.com", "email")],
        );
        let doc = mask_single(&detector, "Hi alice@example.com", &config())
            .await
            .unwrap();
        assert_eq!(doc.masked_text, "Hi [EMAIL]");
    }

    #[tokio::test]
    async fn test_mask_many_preserves_positions() {
        let texts: Vec<Value> = (0..20).map(|i| json!(format!("mail u{}@x.io", i))).collect();
        let detector = texts.iter().enumerate().fold(StaticDetector::new(), |d, (i, t)| {
            d.with(
                t.as_str().unwrap(),
                vec![Detection::new(format!("u{}@x.io", i), "email")],
            )
        });

        let slots = mask_many(&detector, &texts, &config(), 4).await;
        assert_eq!(slots.len(), 20);
        for (i, slot) in slots.iter().enumerate() {
            let doc = slot.as_ref().unwrap();
            assert_eq!(doc.original_text, format!("mail u{}@x.io", i));
            assert_eq!(doc.masked_text, "mail [EMAIL]");
        }
    }

    #[tokio::test]
    async fn test_mask_many_isolates_failures() {
        let detector = StaticDetector::new()
            .with("a@x.io", vec![Detection::new("a@x.io", "email")])
            .failing_on("boom");
        let texts = vec![json!("a@x.io"), json!("boom"), json!(42), json!("a@x.io")];

        let slots = mask_many(&detector, &texts, &config(), 2).await;
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].as_ref().unwrap().masked_text, "[EMAIL]");
        assert!(matches!(slots[1], Err(MaskError::BatchItemFailure { index: 1, .. })));
        assert!(matches!(slots[2], Err(MaskError::BatchItemFailure { index: 2, .. })));
        assert_eq!(slots[3].as_ref().unwrap().masked_text, "[EMAIL]");
    }
}
