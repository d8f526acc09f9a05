//! Browser-session capability.
//!
//! A session holds exactly one loaded page at a time. The Navigator and the
//! page adapter only ever talk to a [`BrowserSession`]; concrete drivers
//! live behind it.

use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;

/// The page currently loaded in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// URL after redirects.
    pub url: String,
    /// HTTP status of the final response, when the driver knows it.
    pub status: Option<u16>,
    pub html: String,
}

#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Loads `url`, replacing the current page.
    ///
    /// Pages with error statuses still load; only transport failures are
    /// returned as errors.
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError>;

    fn page(&self) -> &Page;

    fn current_url(&self) -> &str {
        &self.page().url
    }

    /// Waits at most `timeout` for an element matching `selector`.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> bool;

    /// Activates the first element matching `selector`.
    ///
    /// Returns `Ok(false)` when nothing clickable matched.
    async fn click(&mut self, selector: &str) -> Result<bool, ScraperError>;

    /// Writes a diagnostic copy of the current page to `path`.
    async fn save_snapshot(&self, path: &Path) -> Result<(), ScraperError>;

    /// Releases the session. Called exactly once at the end of a run.
    async fn close(&mut self);
}

/// Acquires exclusive sessions, one per run.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: BrowserSession + 'static;

    async fn open(&self) -> Result<Self::Session, ScraperError>;
}

/// Owns one run's session and makes sure it is released.
///
/// [`SessionGuard::close`] closes the session in place. A guard dropped
/// without being closed, as when its task is aborted, hands the session to a
/// background task that closes it while a Tokio runtime is still available.
pub struct SessionGuard<S: BrowserSession + 'static> {
    session: Option<S>,
}

impl<S: BrowserSession + 'static> SessionGuard<S> {
    #[must_use]
    pub fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Closes the session and consumes the guard.
    pub async fn close(mut self) {
        if let Some(mut session) = self.session.take() {
            session.close().await;
        }
    }
}

impl<S: BrowserSession + 'static> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        match &self.session {
            Some(session) => session,
            None => unreachable!("session is only taken by close or drop"),
        }
    }
}

impl<S: BrowserSession + 'static> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        match &mut self.session {
            Some(session) => session,
            None => unreachable!("session is only taken by close or drop"),
        }
    }
}

impl<S: BrowserSession + 'static> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                tracing::warn!("browser session dropped without close — closing in background");
                runtime.spawn(async move { session.close().await });
            }
            Err(_) => tracing::warn!("browser session dropped without close and no runtime left"),
        }
    }
}
