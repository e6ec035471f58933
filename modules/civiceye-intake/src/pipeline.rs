//! Top-level report pipeline.
//!
//! The single entry point for collaborators: extract features, run the
//! classification cascade, score against the similarity index, derive the
//! final status. Stateless per invocation; the shared index is the only
//! mutable resource and the pipeline itself never inserts into it; the
//! persistence layer calls `SimilarityIndex::add` after a decision sticks.

use std::sync::Arc;

use tracing::{info, warn};

use civiceye_common::{
    authority_for, IntakeConfig, ReportDecision, ReportStatus, Submission, Vocabulary,
};

use crate::classify::{ClassificationCascade, ImageClassifier, TextClassifier};
use crate::content;
use crate::dedup::DuplicateDetector;
use crate::features::FeatureExtractor;
use crate::index::SimilarityIndex;

pub struct ReportPipeline {
    extractor: FeatureExtractor,
    cascade: ClassificationCascade,
    detector: DuplicateDetector,
    index: Arc<SimilarityIndex>,
    t_confirm: f64,
    min_text_length: usize,
    suspicion_threshold: f32,
}

impl ReportPipeline {
    pub fn new(config: &IntakeConfig, vocabulary: Vocabulary, index: Arc<SimilarityIndex>) -> Self {
        Self {
            extractor: FeatureExtractor::new(vocabulary),
            cascade: ClassificationCascade::new(config),
            detector: DuplicateDetector::new(config),
            index,
            t_confirm: config.t_confirm,
            min_text_length: config.min_text_length,
            suspicion_threshold: config.suspicion_threshold,
        }
    }

    pub fn with_image_classifier(mut self, classifier: Arc<dyn ImageClassifier>) -> Self {
        self.cascade = self.cascade.with_image_classifier(classifier);
        self
    }

    pub fn with_text_classifier(mut self, classifier: Arc<dyn TextClassifier>) -> Self {
        self.cascade = self.cascade.with_text_classifier(classifier);
        self
    }

    /// Process one submission to a finalized decision. Total: a submission
    /// violating the text-or-image precondition degrades to the terminal
    /// fallback classification instead of failing.
    pub async fn process(&self, submission: &Submission) -> ReportDecision {
        if submission.text.is_none() && submission.image_bytes.is_none() {
            // The intake layer should have rejected this; degrade, don't crash.
            warn!(
                submitter = %submission.submitter_id,
                "submission has neither text nor image"
            );
        }

        let bundle = self.extractor.extract(submission);
        let classification = self
            .cascade
            .classify(
                &bundle,
                submission.declared_category,
                submission.trusted_submitter,
                submission.image_bytes.as_deref(),
            )
            .await;

        let duplicate = self
            .detector
            .detect(&bundle, classification.category, &self.index);

        let suspicion = content::suspicion_score(
            submission.text.as_deref(),
            submission.image_bytes.as_deref(),
            self.min_text_length,
        );

        let final_status = if duplicate.is_likely_duplicate {
            if duplicate.similarity_score >= self.t_confirm {
                ReportStatus::FlaggedDuplicate
            } else {
                // Review band: between t_duplicate and t_confirm, a human
                // decides. Never silently dropped.
                ReportStatus::FlaggedSuspicious
            }
        } else if suspicion >= self.suspicion_threshold {
            ReportStatus::FlaggedSuspicious
        } else {
            ReportStatus::Accepted
        };

        info!(
            submitter = %submission.submitter_id,
            category = %classification.category,
            confidence = classification.confidence,
            duplicate_score = duplicate.similarity_score,
            suspicion,
            status = ?final_status,
            authority = authority_for(classification.category).department,
            "report decision"
        );

        ReportDecision {
            classification,
            duplicate,
            final_status,
        }
    }
}
