//! Persisted report shapes: metadata, the generated summary, and the full
//! extraction report written once per run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::review::{Review, SentimentCounts};

/// Number of entries in each of `pros`, `cons` and `summary`.
pub const SUMMARY_ITEMS: usize = 5;
pub const NO_PROS: &str = "No pros available";
pub const NO_CONS: &str = "No cons available";
pub const NO_SUMMARY: &str = "No summary available";

/// Value of `metadata.source` in persisted reports.
pub const SOURCE_NAME: &str = "Amazon";
/// Value of `metadata.extractor_version` in persisted reports.
pub const EXTRACTOR_VERSION: &str = "1.1";

/// Pros/cons/summary for one product plus the aggregate score.
///
/// Fields missing from a persisted file deserialize to the "not available"
/// payload of [`Summary::unavailable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub summary: Vec<String>,
    pub review_counts: SentimentCounts,
    /// `0..=100`, derived from the mean star rating.
    pub total_score: u8,
}

impl Summary {
    /// The fallback payload used when no summary could be generated.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            pros: vec![NO_PROS.to_string(); SUMMARY_ITEMS],
            cons: vec![NO_CONS.to_string(); SUMMARY_ITEMS],
            summary: vec![NO_SUMMARY.to_string(); SUMMARY_ITEMS],
            review_counts: SentimentCounts::default(),
            total_score: 0,
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// Truncates `items` to [`SUMMARY_ITEMS`] entries and pads with `filler`.
#[must_use]
pub fn fit_items(mut items: Vec<String>, filler: &str) -> Vec<String> {
    items.truncate(SUMMARY_ITEMS);
    while items.len() < SUMMARY_ITEMS {
        items.push(filler.to_string());
    }
    items
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub product_url: String,
    /// Identifier parsed from the product URL, or `unknown_asin`.
    #[serde(default)]
    pub product_id: String,
    pub extraction_date: DateTime<Utc>,
    pub total_reviews: usize,
    pub source: String,
    pub extractor_version: String,
}

impl ReportMetadata {
    #[must_use]
    pub fn new(product_url: &str, product_id: &str, total_reviews: usize) -> Self {
        Self {
            product_url: product_url.to_string(),
            product_id: product_id.to_string(),
            extraction_date: Utc::now(),
            total_reviews,
            source: SOURCE_NAME.to_string(),
            extractor_version: EXTRACTOR_VERSION.to_string(),
        }
    }
}

/// The finalized output of one extraction run, persisted exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub metadata: ReportMetadata,
    pub reviews: Vec<Review>,
    pub sentiment_analysis: SentimentCounts,
    #[serde(default)]
    pub summary: Summary,
}
