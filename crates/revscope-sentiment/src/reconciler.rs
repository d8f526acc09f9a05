//! Presentation-time Summary Reconciler.
//!
//! Given authoritative target counts, assigns each displayed review a label
//! so that labels are handed out by rank rather than by each review's own
//! threshold:
//!
//! 1. score every review (`0.0` for an empty body)
//! 2. order by score, highest first, keeping original order among ties
//! 3. walk that order once: `positive` while the positive quota is open;
//!    otherwise `negative` while the negative quota is open and the review's
//!    own score is below zero; otherwise `neutral`
//!
//! Reviews the walk cannot place as negative fall through to neutral, so
//! assigned labels may undershoot the negative target. The counts reported
//! for display are always the target counts with `total` set to the number
//! of reviews.

use revscope_core::{Review, Sentiment, SentimentCounts};

use crate::scorer::polarity_score;

/// Compound score used for ranking; empty bodies score `0.0`.
#[must_use]
pub fn ranking_score(review: &Review) -> f64 {
    if review.has_body() {
        polarity_score(&review.body)
    } else {
        0.0
    }
}

/// Assigns one label per score, in input order, by rank-then-fill.
#[must_use]
pub fn assign_labels(scores: &[f64], target: &SentimentCounts) -> Vec<Sentiment> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // `sort_by` is stable, so equal scores keep their original relative order.
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut assigned = SentimentCounts::default();
    let mut labels = vec![Sentiment::Neutral; scores.len()];
    for idx in order {
        let label = if assigned.positive < target.positive {
            Sentiment::Positive
        } else if assigned.negative < target.negative && scores[idx] < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };
        assigned.record(label);
        labels[idx] = label;
    }

    tracing::debug!(
        target_positive = target.positive,
        target_negative = target.negative,
        assigned_positive = assigned.positive,
        assigned_negative = assigned.negative,
        assigned_neutral = assigned.neutral,
        "reconciled review labels"
    );
    labels
}

/// Overwrites every review's `sentiment` with its reconciled label and
/// returns the counts to display.
pub fn reconcile(reviews: &mut [Review], target: &SentimentCounts) -> SentimentCounts {
    let scores: Vec<f64> = reviews.iter().map(ranking_score).collect();
    let labels = assign_labels(&scores, target);
    for (review, label) in reviews.iter_mut().zip(labels) {
        review.sentiment = Some(label);
    }
    target.with_total(reviews.len())
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod tests;
