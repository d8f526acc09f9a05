//! In-memory session and page fixtures shared by the unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;

use crate::error::ScraperError;
use crate::session::{BrowserSession, Page};
use crate::strategy::{is_present, select_first};

/// One review block in storefront markup.
pub struct ReviewFixture<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub rating: &'a str,
    pub title: &'a str,
    pub body: &'a str,
}

impl<'a> ReviewFixture<'a> {
    pub fn new(id: &'a str, body: &'a str) -> Self {
        Self {
            id,
            name: "Asha",
            rating: "4.0 out of 5 stars",
            title: "Solid",
            body,
        }
    }
}

pub fn review_block(review: &ReviewFixture<'_>) -> String {
    format!(
        r#"<div data-hook="review" id="{id}">
             <span class="a-profile-name">{name}</span>
             <i data-hook="review-star-rating"><span class="a-icon-alt">{rating}</span></i>
             <a data-hook="review-title"><span>{title}</span></a>
             <span data-hook="review-date">Reviewed in India on 5 January 2024</span>
             <span data-hook="avp-badge">Verified Purchase</span>
             <span data-hook="review-body"><span>{body}</span></span>
           </div>"#,
        id = review.id,
        name = review.name,
        rating = review.rating,
        title = review.title,
        body = review.body,
    )
}

/// A reviews page. `next` is the href of an enabled next-page link; `None`
/// renders a disabled next button.
pub fn reviews_page(reviews: &[ReviewFixture<'_>], next: Option<&str>) -> String {
    let blocks: String = reviews.iter().map(review_block).collect();
    let pagination = match next {
        Some(href) => format!(r#"<ul class="a-pagination"><li class="a-last"><a href="{href}">Next page</a></li></ul>"#),
        None => r#"<ul class="a-pagination"><li class="a-disabled a-last">Next page</li></ul>"#
            .to_string(),
    };
    format!(
        r#"<html><body><div id="cm_cr-review_list">{blocks}</div>{pagination}</body></html>"#
    )
}

pub fn challenge_page() -> String {
    r#"<html><body><div class="a-row a-text-center"><img src="/captcha.jpg"></div></body></html>"#
        .to_string()
}

/// Scripted session over a fixed map of URL to HTML.
///
/// Unknown URLs load a 404 page. Clicking follows the matched element's
/// `href` as an absolute key into the map.
#[derive(Clone, Default)]
pub struct MapSession {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    failures: HashMap<String, u32>,
    current: Page,
    pub gotos: Arc<AtomicU32>,
    pub snapshots: Arc<Mutex<Vec<PathBuf>>>,
    pub closed: bool,
}

impl MapSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    /// Loading `from` ends up at `to`.
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// The first `times` loads of `url` come back as not-found.
    pub fn failing(mut self, url: &str, times: u32) -> Self {
        self.failures.insert(url.to_string(), times);
        self
    }

    pub fn goto_count(&self) -> u32 {
        self.gotos.load(Ordering::SeqCst)
    }

    pub fn snapshot_paths(&self) -> Vec<PathBuf> {
        self.snapshots.lock().unwrap().clone()
    }

    fn not_found(url: String) -> Page {
        Page {
            url,
            status: Some(404),
            html: "<html><body>Document Not Found</body></html>".to_string(),
        }
    }

    fn href_for(&self, selector: &str) -> Option<String> {
        let doc = Html::parse_document(&self.current.html);
        let root = doc.root_element();
        select_first(root, selector)
            .and_then(|el| el.value().attr("href"))
            .map(ToString::to_string)
    }
}

#[async_trait]
impl BrowserSession for MapSession {
    async fn goto(&mut self, url: &str) -> Result<(), ScraperError> {
        self.gotos.fetch_add(1, Ordering::SeqCst);
        let landed = self.redirects.get(url).cloned().unwrap_or_else(|| url.to_string());
        if let Some(remaining) = self.failures.get_mut(&landed).filter(|n| **n > 0) {
            *remaining -= 1;
            self.current = Self::not_found(landed);
            return Ok(());
        }
        self.current = match self.pages.get(&landed) {
            Some(html) => Page {
                url: landed,
                status: Some(200),
                html: html.clone(),
            },
            None => Self::not_found(landed),
        };
        Ok(())
    }

    fn page(&self) -> &Page {
        &self.current
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> bool {
        is_present(&Html::parse_document(&self.current.html), selector)
    }

    async fn click(&mut self, selector: &str) -> Result<bool, ScraperError> {
        let Some(href) = self.href_for(selector) else {
            return Ok(false);
        };
        self.goto(&href).await?;
        Ok(true)
    }

    async fn save_snapshot(&self, path: &Path) -> Result<(), ScraperError> {
        self.snapshots.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}
