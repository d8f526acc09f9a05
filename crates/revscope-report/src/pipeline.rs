//! End-to-end extraction run.
//!
//! One call to [`Pipeline::run_extraction`] validates the request, acquires a
//! browser session, collects, classifies, summarizes, assembles and persists.
//! Progress is written to the run's [`RunHandle`]; failures are recorded on
//! it and returned as a [`RunOutcome`], never propagated.

use std::path::PathBuf;
use std::time::Duration;

use revscope_core::{
    extract_product_id, reviews_url, AppConfig, RetryPolicy, RunHandle, RunRequest,
};
use revscope_scraper::pause::until_cancelled;
use revscope_scraper::{
    BrowserSession, Collector, HttpSessionProvider, NavigationTiming, Navigator, PageAdapter,
    ScraperError, SessionGuard, SessionProvider, StorefrontAdapter,
};
use tokio_util::sync::CancellationToken;

use crate::assembler::assemble;
use crate::error::ReportError;
use crate::generator::{ChatCompletionsClient, TextGenerator};
use crate::persist::{persist, Persisted};
use crate::summary::summarize;

/// Message recorded when a run ends without any reviews.
pub const NO_REVIEWS_MESSAGE: &str = "Extraction failed or no reviews found";
pub const CANCELLED_MESSAGE: &str = "Extraction cancelled";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { files: Persisted, reviews: usize },
    /// `reviews_collected` counts reviews gathered before the failure.
    /// When collection stopped mid-run with reviews in hand, they were
    /// reconciled and saved to `partial`.
    Failed {
        error: String,
        reviews_collected: usize,
        partial: Option<Persisted>,
    },
    Cancelled,
}

/// Run-independent pipeline settings.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub timing: NavigationTiming,
    pub summary_policy: RetryPolicy,
    pub output_dir: PathBuf,
    pub snapshot_dir: Option<PathBuf>,
    pub allowed_url_prefixes: Vec<String>,
    pub reviews_base_url: String,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timing: NavigationTiming::from_config(config),
            summary_policy: RetryPolicy::fixed(
                config.summary_max_attempts.max(1),
                Duration::from_secs(config.summary_retry_delay_secs),
            ),
            output_dir: config.output_dir.clone(),
            snapshot_dir: Some(config.snapshot_dir.clone()),
            allowed_url_prefixes: config.allowed_url_prefixes.clone(),
            reviews_base_url: config.reviews_base_url.clone(),
        }
    }
}

/// Everything one run needs besides its request.
pub struct Pipeline<P, A, G> {
    provider: P,
    adapter: A,
    generator: Option<G>,
    settings: PipelineSettings,
}

/// The production pipeline: HTTP sessions, the storefront adapter and an
/// OpenAI-compatible summary endpoint.
pub type HttpPipeline = Pipeline<HttpSessionProvider, StorefrontAdapter, ChatCompletionsClient>;

impl HttpPipeline {
    /// # Errors
    ///
    /// Returns [`ReportError::Http`] if the summary client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ReportError> {
        let generator = ChatCompletionsClient::from_config(config)?;
        if generator.is_none() {
            tracing::warn!("OPENAI_API_KEY not set — summaries will use default values");
        }
        Ok(Pipeline::new(
            HttpSessionProvider::from_config(config),
            StorefrontAdapter::new(),
            generator,
            PipelineSettings::from_config(config),
        ))
    }
}

/// What `execute` persisted, and the collection failure it saved around.
struct Finished {
    files: Persisted,
    reviews: usize,
    failure: Option<String>,
}

/// Why a run stopped before persisting.
enum Abort {
    Failed(String, usize),
    Cancelled,
}

impl<P, A, G> Pipeline<P, A, G>
where
    P: SessionProvider,
    A: PageAdapter,
    G: TextGenerator,
{
    #[must_use]
    pub fn new(provider: P, adapter: A, generator: Option<G>, settings: PipelineSettings) -> Self {
        Self {
            provider,
            adapter,
            generator,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Executes one run to completion, recording every step on `handle`.
    pub async fn run_extraction(
        &self,
        request: RunRequest,
        handle: &RunHandle,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        match self.execute(request, handle, cancel).await {
            Ok(Finished {
                files,
                reviews,
                failure: None,
            }) => {
                handle.complete(&files.results, files.summary.as_deref()).await;
                RunOutcome::Completed { files, reviews }
            }
            Ok(Finished {
                files,
                reviews,
                failure: Some(error),
            }) => {
                tracing::error!(
                    error = %error,
                    reviews_collected = reviews,
                    results = %files.results.display(),
                    "extraction failed — partial results saved"
                );
                handle
                    .fail_with_results(error.clone(), &files.results, files.summary.as_deref())
                    .await;
                RunOutcome::Failed {
                    error,
                    reviews_collected: reviews,
                    partial: Some(files),
                }
            }
            Err(Abort::Cancelled) => {
                tracing::warn!("extraction cancelled");
                handle.fail(CANCELLED_MESSAGE).await;
                RunOutcome::Cancelled
            }
            Err(Abort::Failed(error, reviews_collected)) => {
                tracing::error!(error = %error, reviews_collected, "extraction failed");
                handle.fail(error.clone()).await;
                RunOutcome::Failed {
                    error,
                    reviews_collected,
                    partial: None,
                }
            }
        }
    }

    async fn execute(
        &self,
        request: RunRequest,
        handle: &RunHandle,
        cancel: &CancellationToken,
    ) -> Result<Finished, Abort> {
        handle.advance(10, "Initializing extractor...").await;
        let request = request
            .validate(&self.settings.allowed_url_prefixes)
            .map_err(|e| Abort::Failed(e.to_string(), 0))?;

        let Some(product_id) = extract_product_id(&request.product_url) else {
            tracing::warn!(product_url = %request.product_url, "no product identifier in URL");
            return Err(Abort::Failed(
                format!("could not derive reviews URL from {}", request.product_url),
                0,
            ));
        };
        let start_url = reviews_url(&self.settings.reviews_base_url, &product_id);
        tracing::info!(
            product_id = %product_id,
            start_url = %start_url,
            max_pages = ?request.max_pages,
            "starting extraction"
        );

        handle.advance(30, "Opening browser session...").await;
        let mut session = SessionGuard::new(
            self.provider
                .open()
                .await
                .map_err(|e| Abort::Failed(format!("failed to open browser session: {e}"), 0))?,
        );

        let pages = request
            .max_pages
            .map_or_else(|| "all".to_string(), |n| n.to_string());
        handle
            .advance(50, format!("Extracting up to {pages} pages..."))
            .await;

        let mut navigator = Navigator::new(&self.adapter, self.settings.timing, cancel.clone());
        if let Some(dir) = &self.settings.snapshot_dir {
            navigator = navigator.with_snapshot_dir(dir);
        }
        let collected = Collector::new(navigator, request.max_pages)
            .with_progress(handle.clone())
            .collect(&mut *session, &start_url)
            .await;
        session.close().await;

        let (reviews, failure) = match collected {
            Ok(collection) => (collection.reviews, None),
            Err(e) if matches!(e.source, ScraperError::Cancelled) => return Err(Abort::Cancelled),
            Err(e) if e.partial.is_empty() => return Err(Abort::Failed(e.source.to_string(), 0)),
            Err(e) => {
                tracing::warn!(
                    error = %e.source,
                    reviews = e.partial.len(),
                    pages_visited = e.pages_visited,
                    "collection stopped early — keeping reviews gathered so far"
                );
                (e.partial, Some(e.source.to_string()))
            }
        };
        if reviews.is_empty() {
            return Err(Abort::Failed(NO_REVIEWS_MESSAGE.to_string(), 0));
        }
        let collected_count = reviews.len();

        handle
            .advance(80, "Analyzing sentiment and generating summary...")
            .await;
        let draft = until_cancelled(
            cancel,
            summarize(
                self.generator.as_ref(),
                &reviews,
                self.settings.summary_policy,
            ),
        )
        .await
        .map_err(|_| Abort::Cancelled)?;
        let report = assemble(
            &request.product_url,
            &product_id,
            reviews,
            draft,
        );

        if cancel.is_cancelled() {
            return Err(Abort::Cancelled);
        }
        handle.advance(90, "Saving results...").await;
        let files = persist(&report, request.format, &self.settings.output_dir)
            .await
            .map_err(|e| Abort::Failed(format!("failed to save results: {e}"), collected_count))?;
        Ok(Finished {
            files,
            reviews: collected_count,
            failure,
        })
    }
}
