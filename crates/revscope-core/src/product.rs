//! Product identifier parsing from storefront URLs.

use std::sync::LazyLock;

use regex::Regex;

/// Sentinel used in file names when no identifier can be parsed.
pub const UNKNOWN_PRODUCT_ID: &str = "unknown_asin";

/// Patterns tried in order; the first capture group is the identifier.
static PRODUCT_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)/dp/([A-Z0-9]{10})",
        r"(?i)/gp/product/([A-Z0-9]{10})",
        r"(?i)/product/([A-Z0-9]{10})",
        r"(?i)/ASIN/([A-Z0-9]{10})",
        r"(?i)/([A-Z0-9]{10})(?:[/?]|$)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Extracts the 10-character product identifier from a product URL.
///
/// Returns the identifier upper-cased, or `None` if no pattern matches.
#[must_use]
pub fn extract_product_id(url: &str) -> Option<String> {
    PRODUCT_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}

/// Builds the reviews listing URL for `product_id` under `base_url`.
#[must_use]
pub fn reviews_url(base_url: &str, product_id: &str) -> String {
    format!(
        "{}/product-reviews/{product_id}",
        base_url.trim_end_matches('/')
    )
}
