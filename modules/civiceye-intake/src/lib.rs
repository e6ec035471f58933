pub mod classify;
pub mod content;
pub mod dedup;
pub mod features;
pub mod index;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use classify::{ClassificationCascade, ImageClassifier, TextClassifier};
pub use dedup::DuplicateDetector;
pub use features::FeatureExtractor;
pub use index::SimilarityIndex;
pub use pipeline::ReportPipeline;
