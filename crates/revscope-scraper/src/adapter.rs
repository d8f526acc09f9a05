//! Page adapter capability.
//!
//! A [`PageAdapter`] knows one storefront's markup: where reviews live on a
//! page, how to read a review's fields, and how pagination is exposed. The
//! Navigator and Collector are written against this trait only.

use async_trait::async_trait;
use revscope_core::RawReview;
use scraper::{ElementRef, Html};

use crate::error::ScraperError;
use crate::session::BrowserSession;
use crate::strategy::{first_match, SelectorMatch};

/// Raw records read from one loaded page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageReviews {
    /// Container selector that located the reviews, if any matched.
    pub selector: Option<&'static str>,
    pub reviews: Vec<RawReview>,
}

#[async_trait]
pub trait PageAdapter: Send + Sync {
    /// Review container selectors in priority order.
    fn review_selectors(&self) -> &[&'static str];

    /// Structural selectors proving a reviews page loaded, in priority order.
    fn review_page_markers(&self) -> &[&'static str];

    /// Element present only on an interactive challenge page.
    fn challenge_marker(&self) -> &'static str;

    /// Clickable "next page" affordances in priority order.
    fn next_page_selectors(&self) -> &[&'static str];

    /// Reads one review element into a field bag. Missing fields stay `None`.
    fn extract_fields(&self, element: ElementRef<'_>) -> RawReview;

    /// `true` when the page advertises an enabled next page.
    fn has_next_page(&self, doc: &Html) -> bool;

    fn find_review_elements<'a>(&self, doc: &'a Html) -> SelectorMatch<'a> {
        first_match(doc, self.review_selectors())
    }

    /// Extracts every review on the page held in `html`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Extraction`] when there is no document to read.
    fn extract_reviews(&self, html: &str) -> Result<PageReviews, ScraperError> {
        if html.trim().is_empty() {
            return Err(ScraperError::Extraction("page has no content".to_string()));
        }
        let doc = Html::parse_document(html);
        let matched = self.find_review_elements(&doc);
        Ok(PageReviews {
            selector: matched.selector(),
            reviews: matched
                .elements()
                .iter()
                .map(|element| self.extract_fields(*element))
                .collect(),
        })
    }

    /// Parses `html` and checks for a next page.
    fn has_next_page_in(&self, html: &str) -> bool {
        self.has_next_page(&Html::parse_document(html))
    }

    /// Activates the first available next-page affordance.
    ///
    /// Returns `true` only when the session ended up on a different URL; an
    /// unchanged URL means pagination is exhausted. A selector whose click
    /// fails is logged and the next one tried.
    async fn go_to_next_page<S>(&self, session: &mut S) -> bool
    where
        S: BrowserSession,
    {
        let before = session.current_url().to_string();
        for &selector in self.next_page_selectors() {
            match session.click(selector).await {
                Ok(true) => {
                    if session.current_url() == before {
                        tracing::warn!(
                            url = %before,
                            "page URL did not change after next-page click — assuming end of pagination"
                        );
                        return false;
                    }
                    tracing::info!(selector, url = %session.current_url(), "navigated to next page");
                    return true;
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::debug!(selector, error = %err, "next-page selector failed");
                }
            }
        }
        tracing::info!("no next-page control found — end of pagination");
        false
    }
}
