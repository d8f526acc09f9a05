//! In-memory presentation of a persisted run.
//!
//! The view fills gaps left by older or hand-edited files, then overlays
//! reconciled per-review labels so they agree with the stored counts. The
//! persisted files are never touched.

use chrono::{DateTime, Utc};
use revscope_core::{
    extract_product_id, OutputFormat, ReportMetadata, Review, Summary, DEFAULT_REVIEWER_NAME,
    DEFAULT_TITLE, UNKNOWN_PRODUCT_ID,
};
use revscope_sentiment::reconcile;
use serde::Serialize;

use crate::persist::{LoadedReport, StoredReview};

/// Date shown for reviews whose stored record has no date at all.
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// What the results page or `show` command displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub metadata: ReportMetadata,
    pub reviews: Vec<Review>,
    pub summary: Summary,
}

fn review_from_stored(stored: StoredReview, index: usize, fallback_time: DateTime<Utc>) -> Review {
    Review {
        id: stored.id.unwrap_or_else(|| format!("review_{}", index + 1)),
        reviewer_name: stored
            .reviewer_name
            .unwrap_or_else(|| DEFAULT_REVIEWER_NAME.to_string()),
        rating: stored.rating.filter(|r| r.is_finite()).unwrap_or(0.0),
        title: stored.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        body: stored.body.unwrap_or_default(),
        date: stored.date.unwrap_or_else(|| UNKNOWN_DATE.to_string()),
        country: stored.country.unwrap_or_default(),
        verified_purchase: stored.verified_purchase.unwrap_or(false),
        product_variant: stored.product_variant.unwrap_or_default(),
        helpful_votes: stored.helpful_votes.unwrap_or(0),
        images: stored.images,
        extracted_at: stored.extracted_at.unwrap_or(fallback_time),
        sentiment: stored.sentiment,
    }
}

/// Builds the display view of `loaded`.
///
/// Target counts come from `sentiment_analysis` for JSON runs and from the
/// summary's `review_counts` for CSV runs, or zero when neither is stored.
/// `product_url` is used for CSV runs, which carry no metadata.
#[must_use]
pub fn build_view(loaded: LoadedReport, product_url: &str) -> ReportView {
    let target = match loaded.format {
        OutputFormat::Json => loaded.sentiment_analysis,
        OutputFormat::Csv => loaded.summary.as_ref().map(|s| s.review_counts),
    }
    .unwrap_or_default();

    let mut metadata = loaded.metadata.unwrap_or_else(|| {
        let product_id =
            extract_product_id(product_url).unwrap_or_else(|| UNKNOWN_PRODUCT_ID.to_string());
        ReportMetadata::new(product_url, &product_id, loaded.reviews.len())
    });
    metadata.total_reviews = loaded.reviews.len();

    let fallback_time = metadata.extraction_date;
    let mut reviews: Vec<Review> = loaded
        .reviews
        .into_iter()
        .enumerate()
        .map(|(index, stored)| review_from_stored(stored, index, fallback_time))
        .collect();

    let review_counts = reconcile(&mut reviews, &target);
    let mut summary = loaded.summary.unwrap_or_else(Summary::unavailable);
    summary.review_counts = review_counts;

    tracing::debug!(
        reviews = reviews.len(),
        positive = review_counts.positive,
        negative = review_counts.negative,
        neutral = review_counts.neutral,
        "built report view"
    );

    ReportView {
        metadata,
        reviews,
        summary,
    }
}
