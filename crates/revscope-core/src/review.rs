use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default reviewer name when the page omits one.
pub const DEFAULT_REVIEWER_NAME: &str = "Unknown";
/// Default title when the page omits one.
pub const DEFAULT_TITLE: &str = "No Title";

/// Sentiment label attached to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One review extracted from a storefront reviews page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Unique within a single extraction run.
    #[serde(rename = "review_id")]
    pub id: String,
    pub reviewer_name: String,
    /// Star rating in `0.0..=5.0`; `0.0` means unknown.
    pub rating: f64,
    pub title: String,
    /// Free text, may be empty.
    pub body: String,
    /// Display string as shown on the page, e.g. `"5 January 2024"`.
    pub date: String,
    pub country: String,
    pub verified_purchase: bool,
    pub product_variant: String,
    pub helpful_votes: u32,
    pub images: Vec<String>,
    pub extracted_at: DateTime<Utc>,
    /// Assigned after extraction; absent until classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl Review {
    /// Returns `true` when the body is non-empty. Whitespace counts as a
    /// body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

/// Field bag produced by a page adapter before defaults are applied.
///
/// Every field is optional: adapters report only what they found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReview {
    pub id: Option<String>,
    pub reviewer_name: Option<String>,
    pub rating: Option<f64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub date: Option<String>,
    pub country: Option<String>,
    pub verified_purchase: Option<bool>,
    pub product_variant: Option<String>,
    pub helpful_votes: Option<u32>,
    pub images: Vec<String>,
}

impl RawReview {
    /// Applies the documented defaults and stamps the review with `id`.
    ///
    /// Blank strings count as missing. Ratings outside `0.0..=5.0` are
    /// treated as unknown.
    #[must_use]
    pub fn into_review(self, id: String, extracted_at: DateTime<Utc>) -> Review {
        let text = |value: Option<String>, default: &str| {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let rating = self
            .rating
            .filter(|r| r.is_finite() && (0.0..=5.0).contains(r))
            .unwrap_or(0.0);

        Review {
            id,
            reviewer_name: text(self.reviewer_name, DEFAULT_REVIEWER_NAME),
            rating,
            title: text(self.title, DEFAULT_TITLE),
            body: text(self.body, ""),
            date: text(self.date, ""),
            country: text(self.country, ""),
            verified_purchase: self.verified_purchase.unwrap_or(false),
            product_variant: text(self.product_variant, ""),
            helpful_votes: self.helpful_votes.unwrap_or(0),
            images: self.images,
            extracted_at,
            sentiment: None,
        }
    }
}

/// Per-label review counts.
///
/// Once finalized by the classifier `total == positive + negative + neutral`.
/// Presentation-time counts may carry a `total` equal to the number of
/// displayed reviews instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    #[serde(default)]
    pub total: usize,
}

impl SentimentCounts {
    /// Builds finalized counts whose `total` is the sum of the three labels.
    #[must_use]
    pub fn new(positive: usize, negative: usize, neutral: usize) -> Self {
        Self {
            positive,
            negative,
            neutral,
            total: positive + negative + neutral,
        }
    }

    /// Increments the counter for `label` and the total.
    pub fn record(&mut self, label: Sentiment) {
        match label {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
        self.total += 1;
    }

    /// Same label counts with `total` replaced.
    #[must_use]
    pub fn with_total(self, total: usize) -> Self {
        Self { total, ..self }
    }
}
