//! Report Assembler: merges collected reviews, sentiment and the generated
//! summary into the record that is persisted once per run.

use revscope_core::{
    fit_items, ExtractionReport, ReportMetadata, Review, Summary, NO_CONS, NO_PROS, NO_SUMMARY,
};
use revscope_sentiment::{aggregate, record_label};

use crate::summary::SummaryDraft;

/// `round(mean of non-zero ratings * 20)`, clamped to `0..=100`.
///
/// Reviews with an unknown (`0.0`) rating are ignored; no rated reviews
/// scores `0`.
#[must_use]
pub fn total_score(reviews: &[Review]) -> u8 {
    let rated: Vec<f64> = reviews
        .iter()
        .map(|r| r.rating)
        .filter(|&rating| rating > 0.0)
        .collect();
    if rated.is_empty() {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)]
    let average = rated.iter().sum::<f64>() / rated.len() as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = (average * 20.0).round().clamp(0.0, 100.0) as u8;
    score
}

/// Assembles the final report.
///
/// Every review is labelled individually (empty bodies as neutral) while the
/// aggregate counts skip empty bodies. A missing draft yields the
/// "not available" summary with zero counts and score.
#[must_use]
pub fn assemble(
    product_url: &str,
    product_id: &str,
    mut reviews: Vec<Review>,
    draft: Option<SummaryDraft>,
) -> ExtractionReport {
    for review in &mut reviews {
        review.sentiment = Some(record_label(&review.body));
    }
    let counts = aggregate(&reviews);

    let summary = match draft {
        Some(draft) => Summary {
            pros: fit_items(draft.pros, NO_PROS),
            cons: fit_items(draft.cons, NO_CONS),
            summary: fit_items(draft.summary, NO_SUMMARY),
            review_counts: counts.with_total(reviews.len()),
            total_score: total_score(&reviews),
        },
        None => Summary::unavailable(),
    };

    tracing::info!(
        product_id,
        reviews = reviews.len(),
        positive = counts.positive,
        negative = counts.negative,
        neutral = counts.neutral,
        total_score = summary.total_score,
        "report assembled"
    );

    ExtractionReport {
        metadata: ReportMetadata::new(product_url, product_id, reviews.len()),
        reviews,
        sentiment_analysis: counts,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use revscope_core::{RawReview, Sentiment, SentimentCounts};

    use super::*;

    fn review(id: &str, rating: f64, body: &str) -> Review {
        RawReview {
            rating: Some(rating),
            body: Some(body.to_string()),
            ..RawReview::default()
        }
        .into_review(id.to_string(), Utc::now())
    }

    fn draft(pros: &[&str]) -> SummaryDraft {
        SummaryDraft {
            pros: pros.iter().map(ToString::to_string).collect(),
            cons: Vec::new(),
            summary: (0..7).map(|i| format!("line {i}")).collect(),
        }
    }

    #[test]
    fn total_score_ignores_unknown_ratings() {
        let reviews = [review("a", 5.0, ""), review("b", 4.0, ""), review("c", 0.0, "")];
        assert_eq!(total_score(&reviews), 90);
    }

    #[test]
    fn total_score_rounds_to_nearest() {
        // mean 4.333.. * 20 = 86.66..
        let reviews = [review("a", 5.0, ""), review("b", 4.0, ""), review("c", 4.0, "")];
        assert_eq!(total_score(&reviews), 87);
    }

    #[test]
    fn total_score_without_ratings_is_zero() {
        assert_eq!(total_score(&[review("a", 0.0, "x")]), 0);
        assert_eq!(total_score(&[]), 0);
    }

    #[test]
    fn short_lists_are_padded_and_long_lists_truncated() {
        let report = assemble(
            "https://www.amazon.in/dp/B0C1234567",
            "B0C1234567",
            vec![review("a", 5.0, "Great")],
            Some(draft(&["light", "cheap", "quiet"])),
        );
        let summary = &report.summary;
        assert_eq!(summary.pros.len(), 5);
        assert_eq!(summary.pros[3], NO_PROS);
        assert_eq!(summary.pros[4], NO_PROS);
        assert_eq!(summary.cons, vec![NO_CONS; 5]);
        assert_eq!(summary.summary.len(), 5);
        assert_eq!(summary.summary[4], "line 4");
    }

    #[test]
    fn empty_bodies_are_labelled_neutral_but_not_counted() {
        let report = assemble(
            "u",
            "B0C1234567",
            vec![
                review("a", 5.0, "Love it, excellent"),
                review("b", 1.0, ""),
                review("c", 1.0, "Terrible, broke in a week"),
            ],
            Some(draft(&[])),
        );

        let labels: Vec<_> = report.reviews.iter().map(|r| r.sentiment).collect();
        assert_eq!(
            labels,
            [
                Some(Sentiment::Positive),
                Some(Sentiment::Neutral),
                Some(Sentiment::Negative)
            ]
        );
        assert_eq!(report.sentiment_analysis, SentimentCounts::new(1, 1, 0));
        assert_eq!(report.summary.review_counts.total, 3);
        assert_eq!(report.summary.review_counts.positive, 1);
        assert_eq!(report.metadata.total_reviews, 3);
    }

    #[test]
    fn missing_draft_uses_unavailable_summary() {
        let report = assemble("u", "B0C1234567", vec![review("a", 5.0, "Great")], None);
        assert_eq!(report.summary, Summary::unavailable());
        assert_eq!(report.sentiment_analysis.positive, 1);
    }
}
