// Test fixtures and mock capabilities for the intake pipeline.
//
// Mocks match the two capability boundaries:
// - FixedImageClassifier / FixedTextClassifier: canned vote, invocation counter
// - FailingClassifier: always errors (model load failure, malformed input)
// - SlowTextClassifier: sleeps past the invocation timeout
//
// Plus helpers for constructing Submission, IndexedReport, and text vectors.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use civiceye_common::{
    CategoryVote, GeoPoint, IndexedReport, IssueCategory, SparseVector, Submission, Vocabulary,
    VoteSource,
};

use crate::classify::{ImageClassifier, TextClassifier};
use crate::features::FeatureExtractor;

/// MG Road area, Pune.
pub const PUNE_CENTER: GeoPoint = GeoPoint {
    lat: 18.5204,
    lon: 73.8567,
};

// ---------------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------------

pub fn submission_with_text(text: &str) -> Submission {
    submission_at(text, None, Utc::now())
}

pub fn submission_at(text: &str, coordinate: Option<GeoPoint>, at: DateTime<Utc>) -> Submission {
    Submission {
        text: (!text.is_empty()).then(|| text.to_string()),
        image_bytes: None,
        declared_category: None,
        coordinate,
        submitted_at: at,
        submitter_id: "citizen-1".to_string(),
        trusted_submitter: false,
    }
}

/// Vectorize text through the default civic vocabulary.
pub fn vectorize(text: &str) -> SparseVector {
    FeatureExtractor::new(Vocabulary::default_civic())
        .extract(&submission_with_text(text))
        .text_vector
}

pub fn indexed_report(
    text: &str,
    coordinate: Option<GeoPoint>,
    at: DateTime<Utc>,
    category: IssueCategory,
) -> IndexedReport {
    IndexedReport {
        report_id: Uuid::new_v4(),
        text_vector: vectorize(text),
        coordinate,
        timestamp: at,
        category,
    }
}

// ---------------------------------------------------------------------------
// Mock capabilities
// ---------------------------------------------------------------------------

/// Image classifier returning a fixed vote.
pub struct FixedImageClassifier {
    vote: CategoryVote,
    invocations: AtomicUsize,
}

impl FixedImageClassifier {
    pub fn new(category: IssueCategory, confidence: f32) -> Self {
        Self {
            vote: CategoryVote {
                category,
                confidence,
                source: VoteSource::Image,
            },
            invocations: AtomicUsize::new(0),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageClassifier for FixedImageClassifier {
    async fn classify_image(&self, _image: &[u8]) -> Result<CategoryVote> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(self.vote)
    }
}

/// Text classifier returning a fixed vote.
pub struct FixedTextClassifier {
    vote: CategoryVote,
    invocations: AtomicUsize,
}

impl FixedTextClassifier {
    pub fn new(category: IssueCategory, confidence: f32) -> Self {
        Self {
            vote: CategoryVote {
                category,
                confidence,
                source: VoteSource::Text,
            },
            invocations: AtomicUsize::new(0),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextClassifier for FixedTextClassifier {
    async fn classify_text(&self, _text: &str) -> Result<CategoryVote> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(self.vote)
    }
}

/// Capability that always fails, as a crashed model runtime would.
pub struct FailingClassifier;

#[async_trait]
impl ImageClassifier for FailingClassifier {
    async fn classify_image(&self, _image: &[u8]) -> Result<CategoryVote> {
        bail!("model runtime unavailable")
    }
}

#[async_trait]
impl TextClassifier for FailingClassifier {
    async fn classify_text(&self, _text: &str) -> Result<CategoryVote> {
        bail!("model runtime unavailable")
    }
}

/// Text classifier that answers, but only after a delay, for exercising the
/// invocation timeout.
pub struct SlowTextClassifier {
    delay: Duration,
    category: IssueCategory,
}

impl SlowTextClassifier {
    pub fn new(delay: Duration, category: IssueCategory) -> Self {
        Self { delay, category }
    }
}

#[async_trait]
impl TextClassifier for SlowTextClassifier {
    async fn classify_text(&self, _text: &str) -> Result<CategoryVote> {
        tokio::time::sleep(self.delay).await;
        Ok(CategoryVote {
            category: self.category,
            confidence: 0.95,
            source: VoteSource::Text,
        })
    }
}
