//! OCR voting: every (variant, config) pair is tried, longest text wins.

use tracing::{debug, warn};

use super::types::{ExtractedText, ImageVariant, OcrConfig, OcrEngine};

/// Whether `candidate` should replace `current` as the best result.
///
/// Only a strictly longer trimmed length wins, so among equally long
/// results the earliest pair is kept.
pub fn is_better(candidate: &str, current: &str) -> bool {
    candidate.trim().chars().count() > current.trim().chars().count()
}

/// Run the full sweep sequentially in (variant, config) order.
///
/// Failed or timed-out calls are counted and skipped. Never fails: an
/// all-failure sweep yields empty text.
pub fn vote_best_text(
    engine: &dyn OcrEngine,
    variants: &[ImageVariant],
    configs: &[OcrConfig],
    language_pack: &str,
) -> ExtractedText {
    let mut best = ExtractedText::default();

    for variant in variants {
        for config in configs {
            best.attempts += 1;
            let text = match engine.recognize(&variant.image, language_pack, config) {
                Ok(text) => text,
                Err(e) => {
                    best.failures += 1;
                    warn!(
                        variant = variant.name,
                        config = config.name,
                        error = %e,
                        "OCR attempt skipped"
                    );
                    continue;
                }
            };

            debug!(
                variant = variant.name,
                config = config.name,
                chars = text.trim().len(),
                "OCR attempt"
            );

            if is_better(&text, &best.text) {
                best.text = text;
                best.variant = Some(variant.name.to_string());
                best.config = Some(config.to_string());
            }
        }
    }

    best
}
