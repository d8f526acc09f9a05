//! Explicit retry policies and the generic helpers that apply them.
//!
//! A [`RetryPolicy`] bounds the total number of attempts and chooses the
//! pause between them. [`with_retry`] retries every error;
//! [`with_retry_if`] stops early on errors the predicate rejects.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Pause inserted between two attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    /// Same pause every time.
    Fixed(Duration),
    /// Uniformly random pause in `min..=max`.
    Jittered { min: Duration, max: Duration },
}

impl Delay {
    /// A jittered delay from millisecond bounds; `max` below `min` collapses to `min`.
    #[must_use]
    pub fn jittered_ms(min_ms: u64, max_ms: u64) -> Self {
        Delay::Jittered {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms.max(min_ms)),
        }
    }

    /// Picks the concrete pause for one gap between attempts.
    #[must_use]
    pub fn sample(&self) -> Duration {
        match *self {
            Delay::Fixed(d) => d,
            Delay::Jittered { min, max } if max <= min => min,
            Delay::Jittered { min, max } => {
                #[allow(clippy::cast_possible_truncation)]
                let (lo, hi) = (min.as_millis() as u64, max.as_millis() as u64);
                Duration::from_millis(rand::rng().random_range(lo..=hi))
            }
        }
    }
}

/// Bounded retry: at most `max_attempts` calls in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Delay,
}

impl RetryPolicy {
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay: Delay::Fixed(delay),
        }
    }

    /// `true` when another attempt is allowed after `attempt` (1-based) failed.
    #[must_use]
    pub fn allows_another(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Runs `operation` until it succeeds or `policy.max_attempts` is reached.
///
/// # Errors
///
/// Returns the error of the final attempt.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, operation: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    with_retry_if(policy, |_| true, operation).await
}

/// Like [`with_retry`], but errors for which `is_retriable` returns `false`
/// are returned immediately.
///
/// # Errors
///
/// Returns the first non-retriable error, or the error of the final attempt.
pub async fn with_retry_if<T, E, P, F, Fut>(
    policy: RetryPolicy,
    is_retriable: P,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    P: Fn(&E) -> bool,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || !policy.allows_another(attempt) {
                    return Err(err);
                }
                let delay = policy.delay.sample();
                #[allow(clippy::cast_possible_truncation)]
                let delay_ms = delay.as_millis() as u64;
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms,
                    error = %err,
                    "attempt failed — retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
