//! Feature extraction for raw submissions.
//!
//! Pure and total: missing text yields a zero vector and empty normalized
//! text, missing or out-of-range coordinates yield `None` (never a sentinel
//! (0,0), which would produce false geospatial matches off the African coast).

use tracing::warn;

use civiceye_common::{FeatureBundle, SparseVector, Submission, Vocabulary};

pub struct FeatureExtractor {
    vocabulary: Vocabulary,
}

impl FeatureExtractor {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Derive the feature bundle for one submission. Deterministic, never fails.
    pub fn extract(&self, submission: &Submission) -> FeatureBundle {
        let normalized_text = submission
            .text
            .as_deref()
            .map(normalize_text)
            .unwrap_or_default();

        let mut text_vector = SparseVector::new();
        for token in normalized_text.split_whitespace() {
            if let Some(index) = self.vocabulary.get(token) {
                text_vector.bump(index, 1.0);
            }
        }

        let coordinate = submission.coordinate.filter(|point| {
            let valid = point.is_valid();
            if !valid {
                warn!(
                    lat = point.lat,
                    lon = point.lon,
                    submitter = %submission.submitter_id,
                    "dropping out-of-range coordinate"
                );
            }
            valid
        });

        FeatureBundle {
            text_vector,
            normalized_text,
            coordinate,
            timestamp: submission.submitted_at,
        }
    }
}

/// Lowercase, strip punctuation, collapse whitespace. Keeps alphanumeric
/// characters of any script so transliterated and Devanagari terms survive.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || is_devanagari_sign(c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Devanagari combining signs (matras, nukta, virama, anusvara) are not
/// alphanumeric but belong to the word they modify. Danda punctuation
/// (U+0964/U+0965) stays excluded.
fn is_devanagari_sign(c: char) -> bool {
    matches!(
        c,
        '\u{0900}'..='\u{0903}'
            | '\u{093A}'..='\u{094F}'
            | '\u{0951}'..='\u{0957}'
            | '\u{0962}'..='\u{0963}'
    )
}
