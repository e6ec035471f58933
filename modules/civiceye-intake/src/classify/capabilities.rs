//! Optional model capabilities.
//!
//! Image and text classifiers are pluggable subsystems that may not be
//! deployed at all. The cascade holds each as `Option<Arc<dyn ...>>`; an
//! explicit absent variant queried once per stage, not null checks scattered
//! through the decision logic. An `Err` from either trait is recovered by the
//! cascade as "no vote" and never retried; the keyword fallback is the retry
//! strategy.

use anyhow::Result;
use async_trait::async_trait;

use civiceye_common::CategoryVote;

/// Maps an image to a candidate issue category with confidence.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify_image(&self, image: &[u8]) -> Result<CategoryVote>;
}

/// Maps free text to a candidate issue category with confidence.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify_text(&self, text: &str) -> Result<CategoryVote>;
}
