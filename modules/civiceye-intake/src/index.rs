//! In-memory similarity index over finalized reports.
//!
//! Partitioned by issue category: cross-category duplicates are impossible
//! by design, so two reports of different categories never share a
//! partition. Locking is per partition; concurrent queries share the read
//! lock while an `add` briefly excludes them on that category only, never
//! serializing unrelated categories.
//!
//! Entries are scanned linearly; exact top-K by cosine score is part of the
//! contract at civic-scale volumes.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::debug;

use civiceye_common::{
    haversine_meters, GeoPoint, IndexedReport, IntakeConfig, IssueCategory, SparseVector,
};

pub struct SimilarityIndex {
    partitions: HashMap<IssueCategory, RwLock<Vec<IndexedReport>>>,
    radius_meters: f64,
    top_k: usize,
}

impl SimilarityIndex {
    pub fn new(config: &IntakeConfig) -> Self {
        let partitions = IssueCategory::ALL
            .into_iter()
            .map(|category| (category, RwLock::new(Vec::new())))
            .collect();
        Self {
            partitions,
            radius_meters: config.radius_meters,
            top_k: config.top_k,
        }
    }

    /// Every category gets a partition in `new()`, so a miss here is an
    /// index-corruption programming error and aborts rather than producing
    /// a silently wrong verdict.
    fn partition(&self, category: IssueCategory) -> &RwLock<Vec<IndexedReport>> {
        self.partitions
            .get(&category)
            .expect("index corruption: missing category partition")
    }

    /// Append a finalized genuine report. Called by the persistence layer
    /// after a decision is accepted. The pipeline itself never inserts.
    pub fn add(&self, report: IndexedReport) {
        let mut entries = self
            .partition(report.category)
            .write()
            .expect("index partition lock poisoned");
        debug!(report_id = %report.report_id, category = %report.category, "indexing report");
        entries.push(report);
    }

    /// Top-K candidates in the entry's category by cosine similarity,
    /// descending. Candidates outside the temporal window, or farther than
    /// the spatial radius when both coordinates are known, are filtered
    /// first. This is a short-circuit only, since the duplicate detector re-scores
    /// whatever survives.
    pub fn query(
        &self,
        category: IssueCategory,
        text_vector: &SparseVector,
        coordinate: Option<GeoPoint>,
        timestamp: DateTime<Utc>,
        window_seconds: i64,
    ) -> Vec<(IndexedReport, f64)> {
        let entries = self
            .partition(category)
            .read()
            .expect("index partition lock poisoned");

        let mut scored: Vec<(IndexedReport, f64)> = entries
            .iter()
            .filter(|entry| {
                let delta = (timestamp - entry.timestamp).num_seconds().abs();
                delta <= window_seconds
            })
            .filter(|entry| match (coordinate, entry.coordinate) {
                (Some(a), Some(b)) => haversine_meters(a, b) <= self.radius_meters,
                _ => true,
            })
            .map(|entry| (entry.clone(), text_vector.cosine(&entry.text_vector)))
            .collect();

        // Descending by score, report id as deterministic tie-break.
        scored.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| a.0.report_id.cmp(&b.0.report_id))
        });
        scored.truncate(self.top_k);
        scored
    }

    /// Retention eviction, the only removal path. Returns the number of
    /// entries dropped across all partitions.
    pub fn evict_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut evicted = 0;
        for partition in self.partitions.values() {
            let mut entries = partition.write().expect("index partition lock poisoned");
            let before = entries.len();
            entries.retain(|entry| entry.timestamp >= cutoff);
            evicted += before - entries.len();
        }
        if evicted > 0 {
            debug!(evicted, "evicted expired index entries");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.partitions
            .values()
            .map(|p| p.read().expect("index partition lock poisoned").len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{indexed_report, vectorize, PUNE_CENTER};
    use chrono::Duration;

    fn index() -> SimilarityIndex {
        SimilarityIndex::new(&IntakeConfig::default())
    }

    #[test]
    fn empty_index_returns_no_candidates() {
        let idx = index();
        let hits = idx.query(
            IssueCategory::Pothole,
            &vectorize("pothole on mg road"),
            Some(PUNE_CENTER),
            Utc::now(),
            72 * 3600,
        );
        assert!(hits.is_empty());
        assert!(idx.is_empty());
    }

    #[test]
    fn exact_text_match_scores_one() {
        let idx = index();
        let now = Utc::now();
        idx.add(indexed_report("pothole on mg road", Some(PUNE_CENTER), now, IssueCategory::Pothole));

        let hits = idx.query(
            IssueCategory::Pothole,
            &vectorize("pothole on mg road"),
            Some(PUNE_CENTER),
            now,
            72 * 3600,
        );
        assert_eq!(hits.len(), 1);
        assert!((hits[0].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn query_only_sees_its_own_category() {
        let idx = index();
        let now = Utc::now();
        idx.add(indexed_report("pothole on mg road", Some(PUNE_CENTER), now, IssueCategory::Pothole));

        let hits = idx.query(
            IssueCategory::Garbage,
            &vectorize("pothole on mg road"),
            Some(PUNE_CENTER),
            now,
            72 * 3600,
        );
        assert!(hits.is_empty(), "cross-category candidates must be invisible");
    }

    #[test]
    fn temporal_window_filters_old_entries() {
        let idx = index();
        let now = Utc::now();
        idx.add(indexed_report(
            "pothole on mg road",
            Some(PUNE_CENTER),
            now - Duration::hours(100),
            IssueCategory::Pothole,
        ));

        let hits = idx.query(
            IssueCategory::Pothole,
            &vectorize("pothole on mg road"),
            Some(PUNE_CENTER),
            now,
            72 * 3600,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn spatial_radius_filters_distant_entries() {
        let idx = index();
        let now = Utc::now();
        // ~1.5km north of the query point
        let far = GeoPoint { lat: PUNE_CENTER.lat + 0.0135, lon: PUNE_CENTER.lon };
        idx.add(indexed_report("pothole on mg road", Some(far), now, IssueCategory::Pothole));

        let hits = idx.query(
            IssueCategory::Pothole,
            &vectorize("pothole on mg road"),
            Some(PUNE_CENTER),
            now,
            72 * 3600,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn missing_coordinate_skips_spatial_filter() {
        let idx = index();
        let now = Utc::now();
        idx.add(indexed_report("pothole on mg road", None, now, IssueCategory::Pothole));

        let hits = idx.query(
            IssueCategory::Pothole,
            &vectorize("pothole on mg road"),
            Some(PUNE_CENTER),
            now,
            72 * 3600,
        );
        assert_eq!(hits.len(), 1, "entries without coordinates stay eligible");
    }

    #[test]
    fn results_are_descending_and_bounded_to_top_k() {
        let idx = index();
        let now = Utc::now();
        for i in 0..8 {
            let text = if i % 2 == 0 {
                "pothole on mg road"
            } else {
                "cracked road surface damage"
            };
            idx.add(indexed_report(text, Some(PUNE_CENTER), now, IssueCategory::Pothole));
        }

        let hits = idx.query(
            IssueCategory::Pothole,
            &vectorize("pothole on mg road"),
            Some(PUNE_CENTER),
            now,
            72 * 3600,
        );
        assert_eq!(hits.len(), 5, "default top_k is 5");
        for pair in hits.windows(2) {
            assert!(pair[0].1 >= pair[1].1, "scores must be descending");
        }
        assert!((hits[0].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn eviction_removes_only_expired_entries() {
        let idx = index();
        let now = Utc::now();
        idx.add(indexed_report("pothole", Some(PUNE_CENTER), now, IssueCategory::Pothole));
        idx.add(indexed_report(
            "garbage pile",
            Some(PUNE_CENTER),
            now - Duration::days(120),
            IssueCategory::Garbage,
        ));

        let evicted = idx.evict_older_than(now - Duration::days(90));
        assert_eq!(evicted, 1);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn concurrent_queries_and_adds_do_not_deadlock() {
        use std::sync::Arc;
        let idx = Arc::new(index());
        let now = Utc::now();

        let writers: Vec<_> = (0..4)
            .map(|_| {
                let idx = Arc::clone(&idx);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        idx.add(indexed_report(
                            "pothole on mg road",
                            Some(PUNE_CENTER),
                            now,
                            IssueCategory::Pothole,
                        ));
                    }
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let idx = Arc::clone(&idx);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let hits = idx.query(
                            IssueCategory::Pothole,
                            &vectorize("pothole on mg road"),
                            Some(PUNE_CENTER),
                            now,
                            72 * 3600,
                        );
                        assert!(hits.len() <= 5);
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }
        assert_eq!(idx.len(), 200);
    }
}
