//! Cancellable waits.

use std::future::Future;

use revscope_core::Delay;
use tokio_util::sync::CancellationToken;

use crate::error::ScraperError;

/// Sleeps for one sample of `delay`, returning early with
/// [`ScraperError::Cancelled`] if `cancel` fires first.
pub async fn pause(delay: Delay, cancel: &CancellationToken) -> Result<(), ScraperError> {
    let duration = delay.sample();
    if duration.is_zero() {
        return if cancel.is_cancelled() {
            Err(ScraperError::Cancelled)
        } else {
            Ok(())
        };
    }
    tokio::select! {
        () = cancel.cancelled() => Err(ScraperError::Cancelled),
        () = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Drives `future` to completion unless `cancel` fires first.
pub async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    future: F,
) -> Result<F::Output, ScraperError> {
    if cancel.is_cancelled() {
        return Err(ScraperError::Cancelled);
    }
    tokio::select! {
        () = cancel.cancelled() => Err(ScraperError::Cancelled),
        output = future => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn zero_pause_returns_immediately() {
        let cancel = CancellationToken::new();
        assert!(pause(Delay::Fixed(Duration::ZERO), &cancel).await.is_ok());
    }

    #[tokio::test]
    async fn cancelled_token_interrupts_long_pause() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = pause(Delay::Fixed(Duration::from_secs(60)), &cancel).await;
        assert!(matches!(result, Err(ScraperError::Cancelled)));
    }

    #[tokio::test]
    async fn until_cancelled_passes_output_through() {
        let cancel = CancellationToken::new();
        let value = until_cancelled(&cancel, async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn until_cancelled_short_circuits_when_already_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = until_cancelled(&cancel, async { 7 }).await;
        assert!(matches!(result, Err(ScraperError::Cancelled)));
    }
}
