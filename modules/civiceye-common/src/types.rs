use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Geo Types ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// True when both components are inside the valid WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Haversine great-circle distance between two lat/lon points in meters.
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();
    EARTH_RADIUS_M * c
}

// --- Issue categories ---

/// The fixed set of civic issue categories. Every classification resolves to
/// one of these; `Other` is the terminal fallback and is never absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Pothole,
    Garbage,
    Streetlight,
    Waterlogging,
    Other,
}

impl IssueCategory {
    /// All categories, in declaration order. Used to pre-create index
    /// partitions so a missing partition is unrepresentable.
    pub const ALL: [IssueCategory; 5] = [
        IssueCategory::Pothole,
        IssueCategory::Garbage,
        IssueCategory::Streetlight,
        IssueCategory::Waterlogging,
        IssueCategory::Other,
    ];
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueCategory::Pothole => write!(f, "pothole"),
            IssueCategory::Garbage => write!(f, "garbage"),
            IssueCategory::Streetlight => write!(f, "streetlight"),
            IssueCategory::Waterlogging => write!(f, "waterlogging"),
            IssueCategory::Other => write!(f, "other"),
        }
    }
}

// --- Sparse text vectors ---

/// Term-frequency vector over a fixed vocabulary. Only non-zero terms are
/// stored, keyed by vocabulary index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    weights: BTreeMap<usize, f64>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of the term at `index`.
    pub fn bump(&mut self, index: usize, count: f64) {
        *self.weights.entry(index).or_insert(0.0) += count;
    }

    pub fn is_zero(&self) -> bool {
        self.weights.is_empty()
    }

    /// Cosine similarity with another vector. 0.0 when either norm is zero,
    /// so missing text never produces a spurious match.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let dot: f64 = self
            .weights
            .iter()
            .filter_map(|(i, w)| other.weights.get(i).map(|v| w * v))
            .sum();
        let norm_a: f64 = self.weights.values().map(|w| w * w).sum::<f64>().sqrt();
        let norm_b: f64 = other.weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

// --- Submissions and derived features ---

/// Raw citizen submission as handed over by the intake layer. The intake
/// layer guarantees at least one of `text` / `image_bytes` is present; the
/// pipeline degrades gracefully if that invariant is violated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub text: Option<String>,
    pub image_bytes: Option<Vec<u8>>,
    pub declared_category: Option<IssueCategory>,
    pub coordinate: Option<GeoPoint>,
    pub submitted_at: DateTime<Utc>,
    pub submitter_id: String,
    /// External trust signal. Only trusted submitters get a declared-category vote.
    pub trusted_submitter: bool,
}

/// Normalized feature bundle derived from one submission. Immutable once
/// produced; owned by the pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureBundle {
    pub text_vector: SparseVector,
    pub normalized_text: String,
    pub coordinate: Option<GeoPoint>,
    pub timestamp: DateTime<Utc>,
}

// --- Votes and classification ---

/// Where a category vote came from. Priority breaks confidence ties:
/// image > text > keyword-fallback > declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteSource {
    Image,
    Text,
    KeywordFallback,
    Declared,
}

impl VoteSource {
    /// Tie-break rank, lower wins.
    pub fn priority(&self) -> u8 {
        match self {
            VoteSource::Image => 0,
            VoteSource::Text => 1,
            VoteSource::KeywordFallback => 2,
            VoteSource::Declared => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryVote {
    pub category: IssueCategory,
    pub confidence: f32,
    pub source: VoteSource,
}

/// Cascade output. `confidence` is the winning vote's confidence, never
/// renormalized across sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: IssueCategory,
    pub confidence: f32,
    pub votes: Vec<CategoryVote>,
}

impl ClassificationResult {
    /// Terminal fallback: no usable vote anywhere in the cascade.
    pub fn fallback(votes: Vec<CategoryVote>) -> Self {
        Self {
            category: IssueCategory::Other,
            confidence: 0.0,
            votes,
        }
    }
}

// --- Index entries ---

/// A finalized genuine report as stored in the similarity index. Never
/// mutated; removed only by retention eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedReport {
    pub report_id: Uuid,
    pub text_vector: SparseVector,
    pub coordinate: Option<GeoPoint>,
    pub timestamp: DateTime<Utc>,
    pub category: IssueCategory,
}

// --- Verdicts and decisions ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateVerdict {
    pub is_likely_duplicate: bool,
    pub matched_report_id: Option<Uuid>,
    /// Best fused score seen, even when below threshold (observability).
    pub similarity_score: f64,
    pub distance_meters: Option<f64>,
    pub time_delta_seconds: Option<f64>,
}

impl DuplicateVerdict {
    /// Verdict for an empty candidate set.
    pub fn no_match() -> Self {
        Self {
            is_likely_duplicate: false,
            matched_report_id: None,
            similarity_score: 0.0,
            distance_meters: None,
            time_delta_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Accepted,
    FlaggedDuplicate,
    FlaggedSuspicious,
}

/// Final pipeline output, constructed once per submission and handed to the
/// persistence collaborator. Re-evaluation requires a new Submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDecision {
    pub classification: ClassificationResult,
    pub duplicate: DuplicateVerdict,
    pub final_status: ReportStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_same_point_is_zero() {
        let p = GeoPoint { lat: 18.5204, lon: 73.8567 };
        assert!(haversine_meters(p, p) < 1e-6);
    }

    #[test]
    fn haversine_pune_to_mumbai() {
        // Pune to Mumbai is roughly 120 km as the crow flies
        let pune = GeoPoint { lat: 18.5204, lon: 73.8567 };
        let mumbai = GeoPoint { lat: 19.0760, lon: 72.8777 };
        let d = haversine_meters(pune, mumbai);
        assert!(d > 100_000.0 && d < 150_000.0, "expected ~120km, got {d}m");
    }

    #[test]
    fn haversine_one_street_over() {
        let a = GeoPoint { lat: 18.5204, lon: 73.8567 };
        let b = GeoPoint { lat: 18.5205, lon: 73.8568 };
        let d = haversine_meters(a, b);
        assert!(d < 20.0, "expected a few meters, got {d}m");
    }

    #[test]
    fn geopoint_range_validation() {
        assert!(GeoPoint { lat: 18.5, lon: 73.8 }.is_valid());
        assert!(!GeoPoint { lat: 91.0, lon: 0.0 }.is_valid());
        assert!(!GeoPoint { lat: 0.0, lon: -181.0 }.is_valid());
    }

    #[test]
    fn cosine_with_self_is_one() {
        let mut v = SparseVector::new();
        v.bump(0, 1.0);
        v.bump(3, 2.0);
        assert!((v.cosine(&v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_with_zero_vector_is_zero() {
        let mut v = SparseVector::new();
        v.bump(1, 1.0);
        let zero = SparseVector::new();
        assert_eq!(v.cosine(&zero), 0.0);
        assert_eq!(zero.cosine(&zero), 0.0);
    }

    #[test]
    fn cosine_disjoint_terms_is_zero() {
        let mut a = SparseVector::new();
        a.bump(0, 1.0);
        let mut b = SparseVector::new();
        b.bump(1, 1.0);
        assert_eq!(a.cosine(&b), 0.0);
    }

    #[test]
    fn cosine_scale_invariant() {
        let mut a = SparseVector::new();
        a.bump(0, 1.0);
        a.bump(1, 1.0);
        let mut b = SparseVector::new();
        b.bump(0, 3.0);
        b.bump(1, 3.0);
        assert!((a.cosine(&b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn vote_source_priority_order() {
        assert!(VoteSource::Image.priority() < VoteSource::Text.priority());
        assert!(VoteSource::Text.priority() < VoteSource::KeywordFallback.priority());
        assert!(VoteSource::KeywordFallback.priority() < VoteSource::Declared.priority());
    }

    #[test]
    fn feature_bundle_round_trips_through_json() {
        let mut text_vector = SparseVector::new();
        text_vector.bump(3, 2.0);
        let bundle = FeatureBundle {
            text_vector,
            normalized_text: "pothole on mg road".to_string(),
            coordinate: Some(GeoPoint { lat: 18.5204, lon: 73.8567 }),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&bundle).unwrap();
        let back: FeatureBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.normalized_text, bundle.normalized_text);
        assert_eq!(back.text_vector, bundle.text_vector);
        assert_eq!(back.coordinate, bundle.coordinate);
    }

    #[test]
    fn report_decision_serializes_snake_case() {
        let decision = ReportDecision {
            classification: ClassificationResult::fallback(Vec::new()),
            duplicate: DuplicateVerdict::no_match(),
            final_status: ReportStatus::FlaggedDuplicate,
        };
        let json = serde_json::to_string(&decision).unwrap();
        assert!(json.contains("\"final_status\":\"flagged_duplicate\""));
        assert!(json.contains("\"category\":\"other\""));
    }
}
