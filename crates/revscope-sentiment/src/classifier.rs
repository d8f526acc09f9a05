//! Threshold classifier and aggregate counts.

use revscope_core::{Review, Sentiment, SentimentCounts};

use crate::scorer::polarity_score;

/// Scores at or above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Scores at or below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Maps a compound score to a label.
#[must_use]
pub fn classify_score(score: f64) -> Sentiment {
    if score >= POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if score <= NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Classifies a review body. Returns `None` for an empty body, which is
/// left out of aggregate counts. A whitespace-only body is classified like
/// any other and lands on neutral.
#[must_use]
pub fn classify(body: &str) -> Option<Sentiment> {
    if body.is_empty() {
        return None;
    }
    Some(classify_score(polarity_score(body)))
}

/// Label stored on an individual review: empty bodies default to neutral.
#[must_use]
pub fn record_label(body: &str) -> Sentiment {
    classify(body).unwrap_or(Sentiment::Neutral)
}

/// Aggregate label counts over every review with a non-empty body.
///
/// `total` is the number of reviews counted, so empty-body reviews are in
/// neither a label nor the total.
#[must_use]
pub fn aggregate(reviews: &[Review]) -> SentimentCounts {
    let mut counts = SentimentCounts::default();
    for label in reviews.iter().filter_map(|r| classify(&r.body)) {
        counts.record(label);
    }
    tracing::debug!(
        positive = counts.positive,
        negative = counts.negative,
        neutral = counts.neutral,
        skipped = reviews.len() - counts.total,
        "aggregated review sentiment"
    );
    counts
}
