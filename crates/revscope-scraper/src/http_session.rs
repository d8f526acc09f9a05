//! `reqwest`-driven browser session over static HTML.
//!
//! The session keeps the last response body as its page. Nothing executes
//! scripts, so `wait_for` is a single check against the loaded markup and
//! `click` follows the matched element's `href`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{Client, Url};
use revscope_core::AppConfig;
use scraper::Html;

use crate::error::ScraperError;
use crate::session::{BrowserSession, Page, SessionProvider};
use crate::strategy::{is_present, select_first};

pub(crate) const BROWSER_FALLBACK_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// One HTTP-backed session. Owns its client so cookies and connection reuse
/// never leak between runs.
pub struct HttpSession {
    client: Client,
    user_agent: String,
    page: Page,
}

impl HttpSession {
    /// Creates a session with a per-request timeout and a fixed user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(browser_headers())
            .build()?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            page: Page::default(),
        })
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn resolve(&self, href: &str) -> Result<Url, ScraperError> {
        let base = Url::parse(&self.page.url).map_err(|e| ScraperError::InvalidUrl {
            url: self.page.url.clone(),
            reason: e.to_string(),
        })?;
        base.join(href).map_err(|e| ScraperError::InvalidUrl {
            url: href.to_string(),
            reason: e.to_string(),
        })
    }
}

/// `href` of the first element matching `selector`, when it leads somewhere.
fn followable_href(html: &str, selector: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let href = select_first(doc.root_element(), selector)?
        .value()
        .attr("href")?
        .trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty() || href.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    Some(href.to_string())
}

fn contains_selector(html: &str, selector: &str) -> bool {
    is_present(&Html::parse_document(html), selector)
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let html = response.text().await?;
        tracing::debug!(url, final_url = %final_url, status, bytes = html.len(), "page loaded");
        self.page = Page {
            url: final_url,
            status: Some(status),
            html,
        };
        Ok(())
    }

    fn page(&self) -> &Page {
        &self.page
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> bool {
        contains_selector(&self.page.html, selector)
    }

    async fn click(&mut self, selector: &str) -> Result<bool, ScraperError> {
        let Some(href) = followable_href(&self.page.html, selector) else {
            return Ok(false);
        };
        let target = self.resolve(&href)?;
        self.goto(target.as_str()).await?;
        Ok(true)
    }

    async fn save_snapshot(&self, path: &Path) -> Result<(), ScraperError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.page.html.as_bytes()).await?;
        Ok(())
    }

    async fn close(&mut self) {
        tracing::debug!(url = %self.page.url, "closing HTTP session");
        self.page = Page::default();
    }
}

/// Opens one [`HttpSession`] per run with a user agent drawn from the pool.
#[derive(Debug, Clone)]
pub struct HttpSessionProvider {
    timeout_secs: u64,
    user_agents: Vec<String>,
}

impl HttpSessionProvider {
    #[must_use]
    pub fn new(timeout_secs: u64, user_agents: Vec<String>) -> Self {
        Self {
            timeout_secs,
            user_agents,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.request_timeout_secs, config.user_agents.clone())
    }

    fn pick_user_agent(&self) -> String {
        self.user_agents
            .choose(&mut rand::rng())
            .map_or_else(|| BROWSER_FALLBACK_UA.to_string(), Clone::clone)
    }
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession, ScraperError> {
        let user_agent = self.pick_user_agent();
        tracing::debug!(user_agent = %user_agent, "opening HTTP session");
        HttpSession::new(self.timeout_secs, &user_agent)
    }
}
