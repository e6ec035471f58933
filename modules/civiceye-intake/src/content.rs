//! Content validation heuristics.
//!
//! Pure suspicion score over the raw submission: gibberish, spam phrases,
//! shouting, undersized images. Supplements the duplicate verdict: a report
//! can be unique yet still worth a human look.

use tracing::debug;

/// Images below this size are almost certainly not photos of anything.
const MIN_IMAGE_BYTES: usize = 1024;

/// Fraction of distinct characters below which text reads as gibberish.
const MIN_CHAR_VARIETY: f32 = 0.3;

const SPAM_INDICATORS: &[&str] = &["click here", "free", "win now", "limited time", "act now"];

/// Suspicion score in [0, 1]. A submission with neither text nor image is
/// maximally suspicious short of certainty (0.9); the intake layer should
/// have rejected it already.
pub fn suspicion_score(
    text: Option<&str>,
    image_bytes: Option<&[u8]>,
    min_text_length: usize,
) -> f32 {
    let text = text.map(str::trim).filter(|t| !t.is_empty());
    if text.is_none() && image_bytes.is_none() {
        return 0.9;
    }

    let mut score: f32 = 0.0;

    if let Some(text) = text {
        let chars: Vec<char> = text.chars().collect();

        if chars.len() < min_text_length {
            score += 0.3;
        }

        let distinct = text
            .to_lowercase()
            .chars()
            .collect::<std::collections::HashSet<_>>()
            .len();
        if (distinct as f32) < chars.len() as f32 * MIN_CHAR_VARIETY {
            score += 0.4;
        }

        let lowered = text.to_lowercase();
        if SPAM_INDICATORS.iter().any(|s| lowered.contains(s)) {
            score += 0.5;
        }

        let has_alpha = chars.iter().any(|c| c.is_alphabetic());
        let all_upper = chars
            .iter()
            .filter(|c| c.is_alphabetic())
            .all(|c| c.is_uppercase());
        if has_alpha && all_upper && chars.len() > 20 {
            score += 0.2;
        }
    }

    if let Some(bytes) = image_bytes {
        if bytes.len() < MIN_IMAGE_BYTES {
            score += 0.4;
        }
    }

    let score = score.min(1.0);
    if score > 0.0 {
        debug!(score, "content validation raised suspicion");
    }
    score
}
