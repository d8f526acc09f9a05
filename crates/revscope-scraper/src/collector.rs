//! Review Collector: walks the paginated reviews listing.
//!
//! The collector is an explicit state machine over [`CollectState`]. It owns
//! the run's review sequence and dedup set; nothing else writes to them.
//!
//! A failed first load fails the run. A failed load of any later page stops
//! collection with the reviews gathered so far. Confirmed challenges and
//! cancellation are fatal wherever they happen.

use std::collections::HashSet;

use chrono::Utc;
use rand::Rng;
use revscope_core::{RawReview, Review, RunHandle};
use thiserror::Error;

use crate::adapter::PageAdapter;
use crate::error::ScraperError;
use crate::navigator::Navigator;
use crate::pause::pause;
use crate::session::BrowserSession;

const FIRST_PAGE: &str = "product reviews page";
const NEXT_PAGE: &str = "next reviews page";

/// Why collection stopped normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The caller's page bound was reached.
    PageLimit,
    /// The page showed no enabled next-page affordance.
    LastPage,
    /// Clicking "next" left the URL unchanged, or no control could be clicked.
    PaginationStalled,
    /// A later page failed to load; earlier pages were kept.
    NavigationFailed(String),
}

#[derive(Debug)]
pub enum CollectState {
    NavigatingFirstPage,
    ExtractingPage,
    CheckingNextPage,
    NavigatingNextPage,
    Done(StopReason),
    Failed(ScraperError),
}

/// Reviews gathered by one run, in first-seen order with unique ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub reviews: Vec<Review>,
    pub pages_visited: u32,
    /// Records read from pages before deduplication.
    pub raw_count: usize,
    pub duplicates: usize,
    pub stop: StopReason,
}

/// A run-failing collection error together with whatever was gathered.
#[derive(Debug, Error)]
#[error("{source} ({} reviews from {pages_visited} pages collected before failure)", .partial.len())]
pub struct CollectError {
    pub source: ScraperError,
    pub partial: Vec<Review>,
    pub pages_visited: u32,
}

/// In-progress run data. Only the collector touches it.
#[derive(Default)]
struct Accumulator {
    reviews: Vec<Review>,
    seen: HashSet<String>,
    pages_visited: u32,
    raw_count: usize,
    duplicates: usize,
}

impl Accumulator {
    /// Stamps and inserts one raw record. Returns `false` for a duplicate.
    fn insert(&mut self, raw: RawReview) -> bool {
        self.raw_count += 1;
        let id = raw.id.clone().unwrap_or_else(|| self.fallback_id());
        if !self.seen.insert(id.clone()) {
            tracing::debug!(review_id = %id, "skipped duplicate review");
            self.duplicates += 1;
            return false;
        }
        self.reviews.push(raw.into_review(id, Utc::now()));
        true
    }

    /// Random `review_NNNNN` id not yet used in this run.
    fn fallback_id(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let id = format!("review_{}", rng.random_range(10_000..=99_999));
            if !self.seen.contains(&id) {
                return id;
            }
        }
    }

    fn finish(self, stop: StopReason) -> Collection {
        Collection {
            reviews: self.reviews,
            pages_visited: self.pages_visited,
            raw_count: self.raw_count,
            duplicates: self.duplicates,
            stop,
        }
    }
}

pub struct Collector<'a, A> {
    navigator: Navigator<'a, A>,
    max_pages: Option<u32>,
    progress: Option<RunHandle>,
}

impl<'a, A: PageAdapter> Collector<'a, A> {
    /// `max_pages` of `None` (or `Some(0)`) means no page bound.
    #[must_use]
    pub fn new(navigator: Navigator<'a, A>, max_pages: Option<u32>) -> Self {
        Self {
            navigator,
            max_pages: max_pages.filter(|&n| n > 0),
            progress: None,
        }
    }

    /// Reports per-page progress messages on `handle`.
    #[must_use]
    pub fn with_progress(mut self, handle: RunHandle) -> Self {
        self.progress = Some(handle);
        self
    }

    /// Collects reviews starting at `start_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError`] when the first page cannot be loaded, a
    /// challenge page is confirmed, or the run is cancelled. Failures on
    /// later pages end collection normally with [`StopReason::NavigationFailed`].
    pub async fn collect<S>(
        &self,
        session: &mut S,
        start_url: &str,
    ) -> Result<Collection, CollectError>
    where
        S: BrowserSession,
    {
        let mut acc = Accumulator::default();
        let mut state = CollectState::NavigatingFirstPage;

        loop {
            tracing::trace!(?state, "collector state");
            state = match state {
                CollectState::NavigatingFirstPage => {
                    match self.navigator.load(session, start_url, FIRST_PAGE).await {
                        Ok(_) => CollectState::ExtractingPage,
                        Err(err) => CollectState::Failed(err),
                    }
                }
                CollectState::ExtractingPage => {
                    if self.navigator.cancel_token().is_cancelled() {
                        CollectState::Failed(ScraperError::Cancelled)
                    } else {
                        self.extract_page(&*session, &mut acc).await;
                        CollectState::CheckingNextPage
                    }
                }
                CollectState::CheckingNextPage => self.check_next_page(&*session, &acc),
                CollectState::NavigatingNextPage => self.navigate_next_page(session).await,
                CollectState::Done(stop) => {
                    let collection = acc.finish(stop);
                    tracing::info!(
                        pages = collection.pages_visited,
                        unique = collection.reviews.len(),
                        duplicates = collection.duplicates,
                        stop = ?collection.stop,
                        "review collection finished"
                    );
                    return Ok(collection);
                }
                CollectState::Failed(source) => {
                    tracing::error!(
                        pages = acc.pages_visited,
                        collected = acc.reviews.len(),
                        error = %source,
                        "review collection failed"
                    );
                    return Err(CollectError {
                        source,
                        partial: acc.reviews,
                        pages_visited: acc.pages_visited,
                    });
                }
            };
        }
    }

    async fn extract_page<S>(&self, session: &S, acc: &mut Accumulator)
    where
        S: BrowserSession,
    {
        acc.pages_visited += 1;
        let page = acc.pages_visited;
        let adapter = self.navigator.adapter();

        let raw = match adapter.extract_reviews(&session.page().html) {
            Ok(found) => {
                if let Some(selector) = found.selector {
                    tracing::info!(page, found = found.reviews.len(), selector, "found reviews");
                } else {
                    tracing::warn!(page, url = %session.current_url(), "no reviews found on page");
                    self.navigator.snapshot(session, "no_reviews_found").await;
                }
                found.reviews
            }
            Err(err) => {
                tracing::error!(page, error = %err, "review extraction failed for page");
                Vec::new()
            }
        };

        let found = raw.len();
        let mut added = 0usize;
        for record in raw {
            if acc.insert(record) {
                added += 1;
            }
        }
        let duplicates = found - added;
        tracing::info!(
            page,
            found,
            duplicates,
            unique = acc.reviews.len(),
            "extracted reviews from page"
        );

        if let Some(handle) = &self.progress {
            handle.set_reviews_collected(acc.reviews.len()).await;
            handle
                .note(format!(
                    "Extracted page {page}: {} unique reviews so far",
                    acc.reviews.len()
                ))
                .await;
        }
    }

    fn check_next_page<S>(&self, session: &S, acc: &Accumulator) -> CollectState
    where
        S: BrowserSession,
    {
        if let Some(limit) = self.max_pages {
            if acc.pages_visited >= limit {
                tracing::info!(limit, "reached maximum page limit");
                return CollectState::Done(StopReason::PageLimit);
            }
        }
        if self
            .navigator
            .adapter()
            .has_next_page_in(&session.page().html)
        {
            CollectState::NavigatingNextPage
        } else {
            tracing::info!("no more review pages available");
            CollectState::Done(StopReason::LastPage)
        }
    }

    async fn navigate_next_page<S>(&self, session: &mut S) -> CollectState
    where
        S: BrowserSession,
    {
        let cancel = self.navigator.cancel_token();
        if let Err(err) = pause(self.navigator.timing().page_pause, cancel).await {
            return CollectState::Failed(err);
        }
        if !self.navigator.adapter().go_to_next_page(session).await {
            return CollectState::Done(StopReason::PaginationStalled);
        }

        let result = match self.navigator.inspect_current(session, NEXT_PAGE).await {
            Err(err) if err.is_retriable() => {
                let url = session.current_url().to_string();
                tracing::warn!(url = %url, error = %err, "next page did not verify — reloading");
                self.navigator.load(session, &url, NEXT_PAGE).await
            }
            other => other,
        };

        match result {
            Ok(_) => CollectState::ExtractingPage,
            Err(err) if err.is_fatal() => CollectState::Failed(err),
            Err(err) => {
                tracing::error!(error = %err, "failed to navigate to next page — keeping partial results");
                CollectState::Done(StopReason::NavigationFailed(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
