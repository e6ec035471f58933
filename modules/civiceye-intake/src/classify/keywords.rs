//! Keyword-fallback classifier.
//!
//! Deterministic, always-available last resort: fixed multilingual keyword
//! lists (English plus transliterated and Devanagari Hindi terms) mapped to
//! the concrete issue categories. Matching is substring-based over the
//! normalized text, so "waterlog" also catches "waterlogging".

use civiceye_common::{CategoryVote, IssueCategory, VoteSource};

/// Match counts saturate here; confidence = count / saturation, capped at 1.
const MATCH_SATURATION: f32 = 4.0;

const POTHOLE_KEYWORDS: &[&str] = &[
    "pothole", "road hole", "broken road", "cracked road", "damaged road",
    "road crack", "street crack", "pavement crack", "asphalt crack",
    "road damage", "street damage", "pavement damage", "surface damage",
    "road repair", "street repair", "सड़क में गड्ढा", "खड्डा", "गड्ढा",
];

const GARBAGE_KEYWORDS: &[&str] = &[
    "garbage", "trash", "waste", "dump", "litter", "refuse", "rubbish",
    "dustbin", "waste bin", "garbage bin", "overflowing", "smell",
    "stench", "dirty", "unclean", "कूड़ा", "गंदगी", "कचरा", "कूड़ादान",
];

const STREETLIGHT_KEYWORDS: &[&str] = &[
    "street light", "streetlight", "lamp", "light not working", "dark",
    "lighting", "bulb", "pole light", "light pole", "broken light",
    "dim light", "flickering", "no light", "बत्ती", "रोशनी", "लाइट",
];

const WATERLOGGING_KEYWORDS: &[&str] = &[
    "waterlog", "waterlogging", "flood", "water on road", "drainage",
    "water stagnant", "overflow", "blocked drain", "water accumulation",
    "puddle", "standing water", "सड़क पर पानी", "जल भराव", "बाढ़",
];

/// Categories in fixed scan order; ties resolve to the earlier entry so the
/// classifier stays deterministic.
const CATEGORY_KEYWORDS: &[(IssueCategory, &[&str])] = &[
    (IssueCategory::Pothole, POTHOLE_KEYWORDS),
    (IssueCategory::Garbage, GARBAGE_KEYWORDS),
    (IssueCategory::Streetlight, STREETLIGHT_KEYWORDS),
    (IssueCategory::Waterlogging, WATERLOGGING_KEYWORDS),
];

/// Classify normalized text by keyword matching. Abstains (returns `None`)
/// when no keyword matches; never errors, never blocks.
pub fn keyword_vote(normalized_text: &str) -> Option<CategoryVote> {
    if normalized_text.is_empty() {
        return None;
    }

    let mut best: Option<(IssueCategory, u32)> = None;
    for (category, keywords) in CATEGORY_KEYWORDS {
        let mut count = 0u32;
        for keyword in *keywords {
            if normalized_text.contains(keyword) {
                // An exact whole-text match is a stronger signal than a
                // substring hit somewhere in a longer report.
                count += if normalized_text == *keyword { 2 } else { 1 };
            }
        }
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((*category, count));
        }
    }

    best.map(|(category, count)| CategoryVote {
        category,
        confidence: (count as f32 / MATCH_SATURATION).min(1.0),
        source: VoteSource::KeywordFallback,
    })
}
