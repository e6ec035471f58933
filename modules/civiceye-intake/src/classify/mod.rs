//! Classification cascade with graceful degradation.
//!
//! Ordered stages, each recording at most one vote:
//! 1. Declared category from a trusted submitter (confidence 1.0, does not
//!    short-circuit; later stages still run for corroboration).
//! 2. Image model, if the capability is deployed and bytes were submitted.
//! 3. Text model, if deployed and the image stage abstained or came in
//!    below the acceptance threshold.
//! 4. Keyword fallback, always.
//!
//! A model timeout or error is a non-event: the stage abstains and the
//! cascade moves on. The terminal fallback (`other`, confidence 0) makes
//! classification total.

mod capabilities;
mod keywords;

pub use capabilities::{ImageClassifier, TextClassifier};
pub use keywords::keyword_vote;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use civiceye_common::{
    CategoryVote, ClassificationResult, FeatureBundle, IntakeConfig, IssueCategory, VoteSource,
};

pub struct ClassificationCascade {
    image: Option<Arc<dyn ImageClassifier>>,
    text: Option<Arc<dyn TextClassifier>>,
    t_accept: f32,
    model_timeout: Duration,
}

impl ClassificationCascade {
    pub fn new(config: &IntakeConfig) -> Self {
        Self {
            image: None,
            text: None,
            t_accept: config.t_accept,
            model_timeout: config.model_timeout,
        }
    }

    pub fn with_image_classifier(mut self, classifier: Arc<dyn ImageClassifier>) -> Self {
        self.image = Some(classifier);
        self
    }

    pub fn with_text_classifier(mut self, classifier: Arc<dyn TextClassifier>) -> Self {
        self.text = Some(classifier);
        self
    }

    /// Classify one feature bundle. Purely computational apart from the
    /// bounded model invocations; always returns a category.
    pub async fn classify(
        &self,
        bundle: &FeatureBundle,
        declared: Option<IssueCategory>,
        trusted_submitter: bool,
        image_bytes: Option<&[u8]>,
    ) -> ClassificationResult {
        let mut votes: Vec<CategoryVote> = Vec::new();

        // Stage 1: declared category, trusted submitters only.
        if let (Some(category), true) = (declared, trusted_submitter) {
            votes.push(CategoryVote {
                category,
                confidence: 1.0,
                source: VoteSource::Declared,
            });
        }

        // Stage 2: image model.
        let image_vote = match (&self.image, image_bytes) {
            (Some(classifier), Some(bytes)) => {
                self.invoke_image(classifier.as_ref(), bytes).await
            }
            _ => None,
        };
        if let Some(vote) = image_vote {
            votes.push(vote);
        }

        // Stage 3: text model, unless the image stage already produced an
        // acceptable vote.
        let image_accepted = image_vote.is_some_and(|v| v.confidence >= self.t_accept);
        if !image_accepted && !bundle.normalized_text.is_empty() {
            if let Some(classifier) = &self.text {
                if let Some(vote) = self
                    .invoke_text(classifier.as_ref(), &bundle.normalized_text)
                    .await
                {
                    votes.push(vote);
                }
            }
        }

        // Stage 4: keyword fallback, always.
        if let Some(vote) = keyword_vote(&bundle.normalized_text) {
            votes.push(vote);
        }

        resolve(votes)
    }

    async fn invoke_image(
        &self,
        classifier: &dyn ImageClassifier,
        bytes: &[u8],
    ) -> Option<CategoryVote> {
        match timeout(self.model_timeout, classifier.classify_image(bytes)).await {
            Ok(Ok(vote)) => Some(clamp(vote)),
            Ok(Err(err)) => {
                warn!(error = %err, "image classifier failed, treating as no vote");
                None
            }
            Err(_) => {
                warn!(timeout = ?self.model_timeout, "image classifier timed out, treating as no vote");
                None
            }
        }
    }

    async fn invoke_text(
        &self,
        classifier: &dyn TextClassifier,
        text: &str,
    ) -> Option<CategoryVote> {
        match timeout(self.model_timeout, classifier.classify_text(text)).await {
            Ok(Ok(vote)) => Some(clamp(vote)),
            Ok(Err(err)) => {
                warn!(error = %err, "text classifier failed, treating as no vote");
                None
            }
            Err(_) => {
                warn!(timeout = ?self.model_timeout, "text classifier timed out, treating as no vote");
                None
            }
        }
    }
}

/// Capability outputs are untrusted; keep confidence inside [0, 1].
fn clamp(mut vote: CategoryVote) -> CategoryVote {
    vote.confidence = vote.confidence.clamp(0.0, 1.0);
    vote
}

/// Pick the winning vote: highest confidence, ties broken by source
/// priority (image > text > keyword-fallback > declared). All votes at
/// confidence 0, or no votes at all, resolve to the terminal fallback.
fn resolve(votes: Vec<CategoryVote>) -> ClassificationResult {
    let winner = votes
        .iter()
        .copied()
        .max_by(|a, b| {
            a.confidence
                .total_cmp(&b.confidence)
                .then_with(|| b.source.priority().cmp(&a.source.priority()))
        })
        .filter(|v| v.confidence > 0.0);

    match winner {
        Some(vote) => {
            debug!(
                category = %vote.category,
                confidence = vote.confidence,
                source = ?vote.source,
                "cascade resolved"
            );
            ClassificationResult {
                category: vote.category,
                confidence: vote.confidence,
                votes,
            }
        }
        None => ClassificationResult::fallback(votes),
    }
}
