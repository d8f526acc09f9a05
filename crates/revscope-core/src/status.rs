//! Per-run status shared between the worker executing a run and the readers
//! polling it.
//!
//! Each run owns one [`RunHandle`]. The worker is the only writer; readers
//! take cloned snapshots. All access goes through a single mutex.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    pub run_id: Uuid,
    pub running: bool,
    /// `0..=100`.
    pub progress: u8,
    pub message: String,
    pub results_file: Option<PathBuf>,
    pub summary_file: Option<PathBuf>,
    pub product_url: String,
    pub num_pages: Option<u32>,
    pub reviews_collected: usize,
    pub error: Option<String>,
}

/// Cloneable handle onto one run's [`RunStatus`].
#[derive(Debug, Clone)]
pub struct RunHandle {
    inner: Arc<Mutex<RunStatus>>,
}

impl RunHandle {
    /// Creates the status for a run that is about to start.
    #[must_use]
    pub fn new(product_url: &str, num_pages: Option<u32>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RunStatus {
                run_id: Uuid::new_v4(),
                running: true,
                progress: 0,
                message: "Starting extraction...".to_string(),
                results_file: None,
                summary_file: None,
                product_url: product_url.to_string(),
                num_pages,
                reviews_collected: 0,
                error: None,
            })),
        }
    }

    /// Returns a copy of the current status.
    pub async fn snapshot(&self) -> RunStatus {
        self.inner.lock().await.clone()
    }

    pub async fn run_id(&self) -> Uuid {
        self.inner.lock().await.run_id
    }

    /// Records a progress step. Progress never moves backwards.
    pub async fn advance(&self, progress: u8, message: impl Into<String>) {
        let mut status = self.inner.lock().await;
        status.progress = status.progress.max(progress.min(100));
        status.message = message.into();
    }

    /// Updates the message without touching progress.
    pub async fn note(&self, message: impl Into<String>) {
        self.inner.lock().await.message = message.into();
    }

    pub async fn set_reviews_collected(&self, count: usize) {
        self.inner.lock().await.reviews_collected = count;
    }

    /// Marks the run finished successfully with its output files.
    pub async fn complete(&self, results_file: &Path, summary_file: Option<&Path>) {
        let mut status = self.inner.lock().await;
        status.running = false;
        status.progress = 100;
        status.message = "Extraction complete!".to_string();
        status.results_file = Some(results_file.to_path_buf());
        status.summary_file = summary_file.map(Path::to_path_buf);
        status.error = None;
    }

    /// Marks the run finished with `error`.
    pub async fn fail(&self, error: impl Into<String>) {
        let mut status = self.inner.lock().await;
        status.running = false;
        status.progress = 100;
        status.error = Some(error.into());
    }

    /// Marks the run failed while keeping the files written from the reviews
    /// gathered before the failure.
    pub async fn fail_with_results(
        &self,
        error: impl Into<String>,
        results_file: &Path,
        summary_file: Option<&Path>,
    ) {
        let mut status = self.inner.lock().await;
        status.running = false;
        status.progress = 100;
        status.message = "Extraction stopped early; partial results saved".to_string();
        status.results_file = Some(results_file.to_path_buf());
        status.summary_file = summary_file.map(Path::to_path_buf);
        status.error = Some(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_handle_is_running_at_zero() {
        let handle = RunHandle::new("https://www.amazon.in/dp/B0C1234567", Some(2));
        let status = handle.snapshot().await;
        assert!(status.running);
        assert_eq!(status.progress, 0);
        assert_eq!(status.num_pages, Some(2));
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn advance_never_moves_backwards() {
        let handle = RunHandle::new("u", None);
        handle.advance(50, "halfway").await;
        handle.advance(30, "late message").await;
        let status = handle.snapshot().await;
        assert_eq!(status.progress, 50);
        assert_eq!(status.message, "late message");
    }

    #[tokio::test]
    async fn complete_records_files() {
        let handle = RunHandle::new("u", None);
        handle
            .complete(Path::new("reviews/a.csv"), Some(Path::new("reviews/a_summary.json")))
            .await;
        let status = handle.snapshot().await;
        assert!(!status.running);
        assert_eq!(status.progress, 100);
        assert_eq!(status.results_file.as_deref(), Some(Path::new("reviews/a.csv")));
        assert!(status.summary_file.is_some());
    }

    #[tokio::test]
    async fn fail_records_error_and_stops() {
        let handle = RunHandle::new("u", None);
        handle.fail("boom").await;
        let status = handle.snapshot().await;
        assert!(!status.running);
        assert_eq!(status.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn fail_with_results_keeps_error_and_files() {
        let handle = RunHandle::new("u", None);
        handle
            .fail_with_results("challenge", Path::new("reviews/a.json"), None)
            .await;
        let status = handle.snapshot().await;
        assert!(!status.running);
        assert_eq!(status.error.as_deref(), Some("challenge"));
        assert_eq!(status.results_file.as_deref(), Some(Path::new("reviews/a.json")));
        assert!(status.summary_file.is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let handle = RunHandle::new("u", None);
        let reader = handle.clone();
        handle.set_reviews_collected(12).await;
        assert_eq!(reader.snapshot().await.reviews_collected, 12);
    }
}
