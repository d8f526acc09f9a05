//! `extract`: one foreground run of the full pipeline.
//!
//! Progress messages from the run's status handle are echoed to stderr and
//! ctrl-c cancels the run.

use std::time::Duration;

use revscope_core::{AppConfig, RunHandle, RunRequest};
use revscope_report::{HttpPipeline, Persisted, RunOutcome};
use tokio_util::sync::CancellationToken;

const PROGRESS_POLL: Duration = Duration::from_millis(500);

/// Runs one extraction and prints the saved file paths, including those of
/// partial results kept from a run that failed midway.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built, or if the run fails or
/// is cancelled.
pub(crate) async fn run_extract(config: &AppConfig, request: RunRequest) -> anyhow::Result<()> {
    let pipeline = HttpPipeline::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build extraction pipeline: {e}"))?;
    let handle = RunHandle::new(&request.product_url, request.max_pages);
    let cancel = CancellationToken::new();

    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("received ctrl-c — cancelling extraction");
                cancel.cancel();
            }
        })
    };
    let progress = tokio::spawn(echo_progress(handle.clone()));

    let outcome = pipeline.run_extraction(request, &handle, &cancel).await;
    interrupt.abort();
    progress.abort();

    match outcome {
        RunOutcome::Completed { files, reviews } => {
            println!("extracted {reviews} reviews");
            print_files(&files);
            Ok(())
        }
        RunOutcome::Failed {
            error,
            reviews_collected,
            partial,
        } => {
            if let Some(files) = partial {
                println!("saved {reviews_collected} reviews collected before the failure");
                print_files(&files);
            }
            anyhow::bail!("extraction failed ({reviews_collected} reviews collected): {error}")
        }
        RunOutcome::Cancelled => anyhow::bail!("extraction cancelled"),
    }
}

fn print_files(files: &Persisted) {
    println!("results: {}", files.results.display());
    if let Some(summary) = &files.summary {
        println!("summary: {}", summary.display());
    }
}

/// Prints each new progress message until aborted.
async fn echo_progress(handle: RunHandle) {
    let mut last = String::new();
    loop {
        let status = handle.snapshot().await;
        if status.message != last {
            eprintln!("[{:>3}%] {}", status.progress, status.message);
            last = status.message;
        }
        if !status.running {
            return;
        }
        tokio::time::sleep(PROGRESS_POLL).await;
    }
}
