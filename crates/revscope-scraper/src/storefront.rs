//! Page adapter for the storefront's product-reviews listing.

use std::sync::LazyLock;

use regex::Regex;
use revscope_core::RawReview;
use scraper::{ElementRef, Html};

use crate::adapter::PageAdapter;
use crate::strategy::{element_text, first_present, select_all, select_first, select_first_of};

const REVIEW_SELECTORS: &[&str] = &[
    r#"div[data-hook="review"]"#,
    "div.a-section.review.aok-relative",
    r#"#cm_cr-review_list div[data-hook="review"]"#,
    ".review",
];

const REVIEW_PAGE_MARKERS: &[&str] = &[
    r#"div[data-hook="review"]"#,
    "div.a-section.review.aok-relative",
    "#cm_cr-review_list",
    ".review",
];

const NEXT_AVAILABLE: &[&str] = &[
    "li.a-last a",
    r#"a[data-hook="pagination-next"]"#,
    "span.a-last a",
];

const NEXT_DISABLED: &[&str] = &["li.a-disabled.a-last", "span.a-last.a-disabled"];

const NEXT_CLICK: &[&str] = &[
    r#"a[aria-label="Next page"]"#,
    r##"#cm_cr-pagination_bar a[title="Next page"]"##,
    "li.a-last a",
    ".a-last a",
    r#"a[data-hook="pagination-bar"]"#,
];

const CHALLENGE_MARKER: &str = "div.a-row.a-text-center img";

mod field {
    pub const REVIEWER: &[&str] = &[".a-profile-name"];
    pub const RATING: &[&str] = &[
        r#"i[data-hook="review-star-rating"]"#,
        r#"i[data-hook="cmps-review-star-rating"]"#,
    ];
    pub const TITLE: &[&str] = &[
        r#"a[data-hook="review-title"]"#,
        r#"span[data-hook="review-title"]"#,
    ];
    pub const BODY: &[&str] = &[
        r#"span[data-hook="review-body"] span"#,
        r#"span[data-hook="review-body"]"#,
    ];
    pub const DATE_LINE: &str = r#"span[data-hook="review-date"]"#;
    pub const VERIFIED: &str = r#"span[data-hook="avp-badge"]"#;
    pub const HELPFUL: &str = r#"span[data-hook="helpful-vote-statement"]"#;
    pub const IMAGES: &str = r#"img[data-hook="review-image-tile"]"#;
    pub const VARIANT: &str = r#"a[data-hook="format-strip"]"#;
}

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number regex"));
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid integer regex"));
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bon\s+(.+)$").expect("valid date regex"));
static COUNTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bin\s+(.+?)\s+on\b").expect("valid country regex"));

/// Adapter for the storefront's `product-reviews` pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorefrontAdapter;

impl StorefrontAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PageAdapter for StorefrontAdapter {
    fn review_selectors(&self) -> &[&'static str] {
        REVIEW_SELECTORS
    }

    fn review_page_markers(&self) -> &[&'static str] {
        REVIEW_PAGE_MARKERS
    }

    fn challenge_marker(&self) -> &'static str {
        CHALLENGE_MARKER
    }

    fn next_page_selectors(&self) -> &[&'static str] {
        NEXT_CLICK
    }

    fn extract_fields(&self, element: ElementRef<'_>) -> RawReview {
        let text_of = |selectors: &[&str]| {
            select_first_of(element, selectors)
                .map(element_text)
                .filter(|text| !text.is_empty())
        };
        let date_line = select_first(element, field::DATE_LINE).map(element_text);

        RawReview {
            id: element
                .value()
                .attr("id")
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(ToString::to_string),
            reviewer_name: text_of(field::REVIEWER),
            rating: text_of(field::RATING).as_deref().and_then(parse_rating),
            title: text_of(field::TITLE),
            body: text_of(field::BODY),
            date: date_line.as_deref().and_then(parse_date),
            country: date_line.as_deref().and_then(parse_country),
            verified_purchase: select_first(element, field::VERIFIED)
                .map(|badge| element_text(badge).contains("Verified Purchase")),
            product_variant: text_of(&[field::VARIANT]),
            helpful_votes: select_first(element, field::HELPFUL)
                .map(element_text)
                .as_deref()
                .and_then(parse_helpful_votes),
            images: select_all(element, field::IMAGES)
                .into_iter()
                .filter_map(|img| img.value().attr("src"))
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .map(ToString::to_string)
                .collect(),
        }
    }

    fn has_next_page(&self, doc: &Html) -> bool {
        if let Some(selector) = first_present(doc, NEXT_AVAILABLE) {
            tracing::debug!(selector, "next page available");
            return true;
        }
        if let Some(selector) = first_present(doc, NEXT_DISABLED) {
            tracing::info!(selector, "found disabled next button — on the last page");
        }
        false
    }
}

fn capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)?
        .get(1)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Star rating from text like `"4.0 out of 5 stars"`.
fn parse_rating(text: &str) -> Option<f64> {
    NUMBER.find(text)?.as_str().parse().ok()
}

/// Display date from a line like `"Reviewed in India on 5 January 2024"`.
fn parse_date(line: &str) -> Option<String> {
    capture(&DATE, line).map(ToString::to_string)
}

/// Country from a line like `"Reviewed in India on 5 January 2024"`.
fn parse_country(line: &str) -> Option<String> {
    capture(&COUNTRY, line).map(ToString::to_string)
}

/// Helpful votes from `"12 people found this helpful"` or
/// `"One person found this helpful"`.
fn parse_helpful_votes(text: &str) -> Option<u32> {
    let digits = text.replace(',', "");
    if let Some(found) = INTEGER.find(&digits) {
        return found.as_str().parse().ok();
    }
    text.trim()
        .to_lowercase()
        .starts_with("one ")
        .then_some(1)
}

#[cfg(test)]
#[path = "storefront_test.rs"]
mod tests;
