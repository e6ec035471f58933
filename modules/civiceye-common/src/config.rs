use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Tunables of the intake pipeline. Thresholds and weights are deliberately
/// configuration, not contracts; deployments tune them per city.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// A classification stage at or above this confidence stops later model
    /// stages from running (the keyword fallback always runs).
    pub t_accept: f32,
    /// Fused score at or above this is a likely duplicate.
    pub t_duplicate: f64,
    /// Fused score at or above this confirms the duplicate outright;
    /// between `t_duplicate` and this lies the human-review band.
    pub t_confirm: f64,

    // Fused-score weights (text / geo / time)
    pub w_text: f64,
    pub w_geo: f64,
    pub w_time: f64,

    /// Spatial pre-filter radius for candidate lookup.
    pub radius_meters: f64,
    /// Temporal candidate window.
    pub window_seconds: i64,
    /// Index entries older than this are eligible for eviction.
    pub retention_days: i64,
    /// Candidates returned per index query.
    pub top_k: usize,

    /// Hard bound on a single model invocation. On expiry the capability is
    /// treated as unavailable for that call.
    pub model_timeout: Duration,

    // Content validation
    pub min_text_length: usize,
    pub suspicion_threshold: f32,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            t_accept: 0.6,
            t_duplicate: 0.75,
            t_confirm: 0.85,
            w_text: 0.5,
            w_geo: 0.3,
            w_time: 0.2,
            radius_meters: 200.0,
            window_seconds: 72 * 3600,
            retention_days: 90,
            top_k: 5,
            model_timeout: Duration::from_secs(5),
            min_text_length: 10,
            suspicion_threshold: 0.7,
        }
    }
}

impl IntakeConfig {
    /// Load configuration from `CIVICEYE_*` environment variables, falling
    /// back to the defaults above. Panics with a clear message on values
    /// that are present but unparseable.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            t_accept: env_parse("CIVICEYE_T_ACCEPT", d.t_accept),
            t_duplicate: env_parse("CIVICEYE_T_DUPLICATE", d.t_duplicate),
            t_confirm: env_parse("CIVICEYE_T_CONFIRM", d.t_confirm),
            w_text: env_parse("CIVICEYE_W_TEXT", d.w_text),
            w_geo: env_parse("CIVICEYE_W_GEO", d.w_geo),
            w_time: env_parse("CIVICEYE_W_TIME", d.w_time),
            radius_meters: env_parse("CIVICEYE_RADIUS_METERS", d.radius_meters),
            window_seconds: env_parse("CIVICEYE_WINDOW_SECONDS", d.window_seconds),
            retention_days: env_parse("CIVICEYE_RETENTION_DAYS", d.retention_days),
            top_k: env_parse("CIVICEYE_TOP_K", d.top_k),
            model_timeout: Duration::from_secs(env_parse(
                "CIVICEYE_MODEL_TIMEOUT_SECS",
                d.model_timeout.as_secs(),
            )),
            min_text_length: env_parse("CIVICEYE_MIN_TEXT_LENGTH", d.min_text_length),
            suspicion_threshold: env_parse("CIVICEYE_SUSPICION_THRESHOLD", d.suspicion_threshold),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid number, got '{raw}'")),
        Err(_) => default,
    }
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Fixed term list used for text vectorization. Built once from the
/// historical corpus and passed in as configuration, never computed per
/// call, so feature extraction stays O(document length).
#[derive(Debug, Clone)]
pub struct Vocabulary {
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = HashMap::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if term.is_empty() {
                continue;
            }
            let next = index.len();
            index.entry(term).or_insert(next);
        }
        Self { index }
    }

    /// Term list distilled from the historical civic-report corpus. Real
    /// deployments load a city-specific list instead.
    pub fn default_civic() -> Self {
        Self::new(DEFAULT_CIVIC_TERMS.iter().copied())
    }

    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

const DEFAULT_CIVIC_TERMS: &[&str] = &[
    // road surface
    "pothole", "potholes", "road", "street", "pavement", "asphalt", "crack",
    "cracked", "hole", "broken", "damaged", "damage", "repair", "surface",
    // waste
    "garbage", "trash", "waste", "dump", "litter", "rubbish", "refuse",
    "dustbin", "bin", "overflowing", "smell", "stench", "dirty", "pile",
    // lighting
    "streetlight", "light", "lights", "lamp", "bulb", "pole", "dark",
    "flickering", "dim",
    // water
    "waterlogging", "waterlogged", "flood", "flooded", "water", "drain",
    "drainage", "stagnant", "puddle", "overflow", "sewage", "leak",
    // general civic vocabulary
    "near", "beside", "outside", "opposite", "corner", "junction", "signal",
    "market", "park", "school", "hospital", "colony", "nagar", "chowk",
    "large", "big", "small", "huge", "deep", "main", "days", "weeks",
    "urgent", "danger", "dangerous", "accident", "blocked", "block",
    "footpath", "sidewalk", "crossing", "bridge", "area", "lane", "mg",
    "not", "working", "since", "still", "please", "fix", "issue", "problem",
    "on", "in", "at", "the", "a", "of", "and", "is", "has", "with",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = IntakeConfig::default();
        assert_eq!(c.t_accept, 0.6);
        assert_eq!(c.t_duplicate, 0.75);
        assert_eq!(c.t_confirm, 0.85);
        assert!((c.w_text + c.w_geo + c.w_time - 1.0).abs() < 1e-9);
        assert_eq!(c.radius_meters, 200.0);
        assert_eq!(c.window_seconds, 72 * 3600);
        assert_eq!(c.top_k, 5);
    }

    #[test]
    fn vocabulary_lookup_and_dedup() {
        let v = Vocabulary::new(["pothole", "road", "Pothole", "  road  "]);
        assert_eq!(v.len(), 2);
        assert_eq!(v.get("pothole"), v.get("pothole"));
        assert!(v.get("road").is_some());
        assert!(v.get("garbage").is_none());
    }

    #[test]
    fn default_vocabulary_covers_core_terms() {
        let v = Vocabulary::default_civic();
        for term in ["pothole", "garbage", "streetlight", "waterlogging", "road"] {
            assert!(v.get(term).is_some(), "missing core term '{term}'");
        }
    }
}
