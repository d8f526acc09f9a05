//! Retryable page loads with challenge detection and page verification.
//!
//! [`Navigator::load`] drives one URL to a usable page. Each attempt loads,
//! settles, then classifies the result:
//!
//! - not found: retried after a randomized backoff until the attempt budget
//!   runs out
//! - challenge URL with the challenge marker present: fatal, never retried
//! - challenge URL without the marker: ends this load, never retried, but
//!   not fatal to a run that already has pages
//! - reviews page: verified against the adapter's prioritized markers, with a
//!   URL-based soft success when no marker matches

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use revscope_core::{AppConfig, Delay, RetryPolicy};
use tokio_util::sync::CancellationToken;

use crate::adapter::PageAdapter;
use crate::error::ScraperError;
use crate::pause::{pause, until_cancelled};
use crate::session::{BrowserSession, Page};

/// Upper bound on each structural-marker wait.
const VERIFY_WAIT: Duration = Duration::from_secs(10);
/// Upper bound on the challenge-marker confirmation wait.
const CHALLENGE_WAIT: Duration = Duration::from_secs(10);

static NOT_FOUND_IN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9])404(?:[^A-Za-z0-9]|$)").expect("valid not-found regex")
});

/// Pauses and bounds used while navigating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTiming {
    /// Total load attempts per URL.
    pub max_attempts: u32,
    /// Pause after every load before the page is inspected.
    pub settle: Delay,
    /// Pause between failed attempts.
    pub backoff: Delay,
    /// Pause before moving to the next page of results.
    pub page_pause: Delay,
    pub verify_wait: Duration,
    pub challenge_wait: Duration,
}

impl NavigationTiming {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.nav_max_attempts,
            settle: Delay::jittered_ms(config.settle_min_ms, config.settle_max_ms),
            backoff: Delay::jittered_ms(config.backoff_min_ms, config.backoff_max_ms),
            page_pause: Delay::jittered_ms(config.page_pause_min_ms, config.page_pause_max_ms),
            verify_wait: VERIFY_WAIT,
            challenge_wait: CHALLENGE_WAIT,
        }
    }

    /// No pauses at all; for tests and local fixtures.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            settle: Delay::Fixed(Duration::ZERO),
            backoff: Delay::Fixed(Duration::ZERO),
            page_pause: Delay::Fixed(Duration::ZERO),
            verify_wait: Duration::ZERO,
            challenge_wait: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            delay: self.backoff,
        }
    }
}

/// How a successful load was confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Not a reviews page; loaded without a not-found or challenge signal.
    Loaded,
    /// A structural marker matched.
    Verified { selector: &'static str },
    /// No marker matched but the URL looks like a reviews URL.
    SoftVerified,
}

pub struct Navigator<'a, A> {
    adapter: &'a A,
    timing: NavigationTiming,
    snapshot_dir: Option<PathBuf>,
    cancel: CancellationToken,
}

impl<'a, A: PageAdapter> Navigator<'a, A> {
    #[must_use]
    pub fn new(adapter: &'a A, timing: NavigationTiming, cancel: CancellationToken) -> Self {
        Self {
            adapter,
            timing,
            snapshot_dir: None,
            cancel,
        }
    }

    /// Enables diagnostic snapshots under `dir`.
    #[must_use]
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn adapter(&self) -> &'a A {
        self.adapter
    }

    #[must_use]
    pub fn timing(&self) -> &NavigationTiming {
        &self.timing
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Loads `url` and confirms the page is usable.
    ///
    /// `description` names the page in logs; when it mentions "reviews" the
    /// page must also pass reviews-page verification.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::ChallengeDetected`] as soon as a challenge page is
    ///   confirmed, without consuming further attempts
    /// - [`ScraperError::ChallengeUnconfirmed`] when the URL looks like a
    ///   challenge but its marker never appears
    /// - [`ScraperError::NavigationFailed`] once every attempt failed
    /// - [`ScraperError::Cancelled`] if the run is cancelled meanwhile
    pub async fn load<S>(
        &self,
        session: &mut S,
        url: &str,
        description: &str,
    ) -> Result<LoadOutcome, ScraperError>
    where
        S: BrowserSession,
    {
        let policy = self.timing.retry_policy();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            tracing::info!(
                attempt,
                max_attempts = policy.max_attempts,
                description,
                url,
                "navigating"
            );

            let result = match until_cancelled(&self.cancel, session.goto(url)).await? {
                Ok(()) => self.inspect_current(session, description).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_retriable() && policy.allows_another(attempt) => {
                    tracing::warn!(
                        attempt,
                        description,
                        error = %err,
                        "navigation attempt failed — backing off"
                    );
                    pause(policy.delay, &self.cancel).await?;
                }
                Err(err) if err.is_retriable() => {
                    tracing::error!(
                        attempts = attempt,
                        description,
                        error = %err,
                        "navigation failed — attempts exhausted"
                    );
                    self.snapshot(&*session, "navigation_failed").await;
                    return Err(ScraperError::NavigationFailed {
                        description: description.to_string(),
                        attempts: attempt,
                        last_error: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Settles, then classifies whatever page the session currently holds.
    ///
    /// Used after a load and after pagination clicks.
    ///
    /// # Errors
    ///
    /// Returns the per-attempt classification error; see [`Self::load`].
    pub async fn inspect_current<S>(
        &self,
        session: &mut S,
        description: &str,
    ) -> Result<LoadOutcome, ScraperError>
    where
        S: BrowserSession,
    {
        pause(self.timing.settle, &self.cancel).await?;

        let url = session.current_url().to_string();
        let lower_url = url.to_lowercase();

        if is_not_found(session.page()) {
            tracing::warn!(url = %url, description, "not-found page detected");
            return Err(ScraperError::NotFound { url });
        }

        if is_challenge_url(&lower_url) {
            return Err(self.confirm_challenge(session, url).await?);
        }

        if !description.to_lowercase().contains("reviews") {
            return Ok(LoadOutcome::Loaded);
        }

        for &selector in self.adapter.review_page_markers() {
            let found = until_cancelled(
                &self.cancel,
                session.wait_for(selector, self.timing.verify_wait),
            )
            .await?;
            if found {
                tracing::info!(selector, "verified reviews page");
                return Ok(LoadOutcome::Verified { selector });
            }
        }

        if lower_url.contains("review") {
            tracing::info!(
                url = %url,
                "on reviews page by URL though no review elements were found"
            );
            self.snapshot(&*session, "reviews_page").await;
            return Ok(LoadOutcome::SoftVerified);
        }

        tracing::warn!(url = %url, "could not verify reviews page with any known selector");
        Err(ScraperError::Unverified { url })
    }

    /// Waits briefly for the challenge marker. Returns the error to surface:
    /// confirmed challenges are fatal, unconfirmed ones end this load only.
    async fn confirm_challenge<S>(
        &self,
        session: &mut S,
        url: String,
    ) -> Result<ScraperError, ScraperError>
    where
        S: BrowserSession,
    {
        tracing::warn!(url = %url, "challenge page detected during navigation");
        let confirmed = until_cancelled(
            &self.cancel,
            session.wait_for(self.adapter.challenge_marker(), self.timing.challenge_wait),
        )
        .await?;
        if confirmed {
            tracing::error!(
                url = %url,
                "challenge confirmed — interactive solving is not possible, failing run"
            );
            self.snapshot(&*session, "challenge").await;
            Ok(ScraperError::ChallengeDetected { url })
        } else {
            tracing::error!(url = %url, "challenge expected but marker not found within timeout");
            Ok(ScraperError::ChallengeUnconfirmed { url })
        }
    }

    /// Saves the current page under the snapshot directory, if one is set.
    /// Failures are logged and otherwise ignored.
    pub async fn snapshot<S>(&self, session: &S, label: &str)
    where
        S: BrowserSession,
    {
        let Some(dir) = &self.snapshot_dir else {
            return;
        };
        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let path = dir.join(format!("{label}_{stamp}.html"));
        match session.save_snapshot(&path).await {
            Ok(()) => tracing::info!(path = %path.display(), "saved page snapshot"),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to save page snapshot");
            }
        }
    }
}

/// Not-found signal: a 404 status, a standalone `404` in the URL, or the
/// storefront's "document not found" body.
pub(crate) fn is_not_found(page: &Page) -> bool {
    page.status == Some(404)
        || NOT_FOUND_IN_URL.is_match(&page.url)
        || page.html.to_lowercase().contains("document not found")
}

pub(crate) fn is_challenge_url(lower_url: &str) -> bool {
    lower_url.contains("captcha") || lower_url.contains("ap/challenge")
}

#[cfg(test)]
#[path = "navigator_test.rs"]
mod tests;
