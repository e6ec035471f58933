//! Duplicate/fake-report detection.
//!
//! Fuses text similarity, geospatial proximity, and temporal recency into a
//! single score per candidate. A signal whose inputs are absent (zero text
//! vector, missing coordinate on either side) contributes nothing and its
//! weight is redistributed across the remaining signals, keeping the fused
//! score in [0, 1] without ever dividing by zero.

use tracing::{debug, info};

use civiceye_common::{
    haversine_meters, DuplicateVerdict, FeatureBundle, IndexedReport, IntakeConfig, IssueCategory,
};

use crate::index::SimilarityIndex;

pub struct DuplicateDetector {
    w_text: f64,
    w_geo: f64,
    w_time: f64,
    t_duplicate: f64,
    radius_meters: f64,
    window_seconds: i64,
}

impl DuplicateDetector {
    pub fn new(config: &IntakeConfig) -> Self {
        Self {
            w_text: config.w_text,
            w_geo: config.w_geo,
            w_time: config.w_time,
            t_duplicate: config.t_duplicate,
            radius_meters: config.radius_meters,
            window_seconds: config.window_seconds,
        }
    }

    /// Score the bundle against prior reports of the same category. An empty
    /// candidate set is a clean non-duplicate verdict, never an error.
    pub fn detect(
        &self,
        bundle: &FeatureBundle,
        category: IssueCategory,
        index: &SimilarityIndex,
    ) -> DuplicateVerdict {
        let candidates = index.query(
            category,
            &bundle.text_vector,
            bundle.coordinate,
            bundle.timestamp,
            self.window_seconds,
        );
        if candidates.is_empty() {
            return DuplicateVerdict::no_match();
        }

        let mut best: Option<(f64, &IndexedReport, Option<f64>, f64)> = None;
        for (candidate, text_sim) in &candidates {
            let distance = match (bundle.coordinate, candidate.coordinate) {
                (Some(a), Some(b)) => Some(haversine_meters(a, b)),
                _ => None,
            };
            let time_delta = (bundle.timestamp - candidate.timestamp)
                .num_seconds()
                .unsigned_abs() as f64;

            let text = (!bundle.text_vector.is_zero() && !candidate.text_vector.is_zero())
                .then_some(*text_sim);
            let geo = distance.map(|d| (1.0 - d / self.radius_meters).max(0.0));
            let time = (1.0 - time_delta / self.window_seconds as f64).max(0.0);

            let fused = self.fuse(text, geo, Some(time));
            debug!(
                candidate = %candidate.report_id,
                fused,
                text_sim,
                ?distance,
                time_delta,
                "scored duplicate candidate"
            );

            // Candidates arrive in deterministic order; strict > keeps the
            // earlier candidate on a fused-score tie.
            if best.as_ref().is_none_or(|(f, ..)| fused > *f) {
                best = Some((fused, candidate, distance, time_delta));
            }
        }

        match best {
            Some((fused, candidate, distance, time_delta)) if fused >= self.t_duplicate => {
                info!(
                    matched = %candidate.report_id,
                    score = fused,
                    "likely duplicate report"
                );
                DuplicateVerdict {
                    is_likely_duplicate: true,
                    matched_report_id: Some(candidate.report_id),
                    similarity_score: fused,
                    distance_meters: distance,
                    time_delta_seconds: Some(time_delta),
                }
            }
            Some((fused, _, distance, time_delta)) => DuplicateVerdict {
                is_likely_duplicate: false,
                matched_report_id: None,
                similarity_score: fused,
                distance_meters: distance,
                time_delta_seconds: Some(time_delta),
            },
            None => DuplicateVerdict::no_match(),
        }
    }

    /// Weighted fusion with proportional redistribution over the signals
    /// actually present. All signals absent → 0.0.
    fn fuse(&self, text: Option<f64>, geo: Option<f64>, time: Option<f64>) -> f64 {
        let mut score = 0.0;
        let mut weight = 0.0;
        for (value, w) in [(text, self.w_text), (geo, self.w_geo), (time, self.w_time)] {
            if let Some(v) = value {
                score += w * v;
                weight += w;
            }
        }
        if weight == 0.0 {
            0.0
        } else {
            score / weight
        }
    }
}
