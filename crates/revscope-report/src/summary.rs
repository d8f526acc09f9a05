//! Pros/cons/summary generation over the collected reviews.
//!
//! Generation is best effort: the request is retried under a fixed policy
//! and every failure degrades to the "not available" payload.


use revscope_core::{with_retry, Review, RetryPolicy};
use serde::{Deserialize, Deserializer};

use crate::error::ReportError;
use crate::generator::TextGenerator;

/// Raw lists returned by the text generator, before fitting to five items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SummaryDraft {
    #[serde(default, deserialize_with = "one_or_many")]
    pub pros: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub cons: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub summary: Vec<String>,
}

/// Accepts either a list of strings or a single string.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(item) => vec![item],
        OneOrMany::Many(items) => items,
    })
}

/// Builds the generation prompt, or `None` when no review has body text.
#[must_use]
pub fn build_prompt(reviews: &[Review]) -> Option<String> {
    let mut lines = String::new();
    for review in reviews.iter().filter(|r| r.has_body()) {
        lines.push_str(&format!(
            "Rating: {:.1}, Review: {}\n",
            review.rating, review.body
        ));
    }
    if lines.is_empty() {
        return None;
    }

    Some(format!(
        "Read the following customer reviews of one product and write:\n\
         1. five pros of the product\n\
         2. five cons of the product\n\
         3. a five-line summary of what reviewers say\n\
         \n\
         Reviews:\n\
         {lines}\n\
         Answer with a single JSON object with the keys \"pros\", \"cons\" and \"summary\", \
         each a list of five strings. Do not add any other text."
    ))
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the language tag on the opening line, if any.
    match rest.split_once('\n') {
        Some((tag, body)) if !tag.trim_start().starts_with('{') => body.trim(),
        _ => rest.trim(),
    }
}

/// Parses a completion into a [`SummaryDraft`].
///
/// # Errors
///
/// Returns [`ReportError::MalformedSummary`] when the completion is not a
/// JSON object of the expected shape.
pub fn parse_summary_response(text: &str) -> Result<SummaryDraft, ReportError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| ReportError::MalformedSummary(e.to_string()))
}

/// Generates a draft summary for `reviews`.
///
/// Returns `None` when there is nothing to summarize, no generator is
/// configured, or every attempt under `policy` failed.
pub async fn summarize<G>(
    generator: Option<&G>,
    reviews: &[Review],
    policy: RetryPolicy,
) -> Option<SummaryDraft>
where
    G: TextGenerator + ?Sized,
{
    let Some(prompt) = build_prompt(reviews) else {
        tracing::warn!("no review text available for summary generation");
        return None;
    };
    let Some(generator) = generator else {
        tracing::warn!("no text generator configured — using default summary");
        return None;
    };

    let result = with_retry(policy, || async {
        let completion = generator.complete(&prompt).await?;
        parse_summary_response(&completion)
    })
    .await;

    match result {
        Ok(draft) => {
            tracing::info!(
                pros = draft.pros.len(),
                cons = draft.cons.len(),
                summary = draft.summary.len(),
                "summary generated"
            );
            Some(draft)
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                attempts = policy.max_attempts,
                "summary generation failed — using default summary"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;
