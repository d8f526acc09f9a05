use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("bot challenge detected at {url}; interactive solving is not supported")]
    ChallengeDetected { url: String },

    #[error("challenge page suspected at {url} but its marker never appeared")]
    ChallengeUnconfirmed { url: String },

    #[error("could not verify reviews page at {url} with any known selector")]
    Unverified { url: String },

    #[error("failed to navigate to {description} after {attempts} attempts: {last_error}")]
    NavigationFailed {
        description: String,
        attempts: u32,
        last_error: String,
    },

    #[error("review extraction failed: {0}")]
    Extraction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("run cancelled")]
    Cancelled,
}

impl ScraperError {
    /// Returns `true` for per-attempt navigation failures worth another load.
    ///
    /// **Retriable:** network failures, not-found pages, pages that load but
    /// cannot be verified as a reviews page.
    ///
    /// **Not retriable:** challenge pages (confirmed or suspected),
    /// cancellation, bad URLs, and exhausted navigation budgets.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_) | ScraperError::NotFound { .. } | ScraperError::Unverified { .. }
        )
    }

    /// Returns `true` for errors that must end the whole run even after
    /// earlier pages were collected.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScraperError::ChallengeDetected { .. } | ScraperError::Cancelled
        )
    }
}
