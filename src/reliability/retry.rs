//! Backoff loop around a single marketplace call.
//!
//! A call is repeated only when it never produced a response. Once bol.com has answered,
//! even with a 5xx, the answer is final: order shipments and offer writes are not idempotent.

use std::time::Duration;

use crate::error::ApiError;

/// How often and how patiently a failed call is repeated.
///
/// Waits start at `initial_delay` and are multiplied by `backoff_multiplier` after each
/// failure, never exceeding `max_delay`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use bol_api::reliability::RetryPolicy;
///
/// // three attempts, 100ms then 200ms apart
/// let policy = RetryPolicy::default();
///
/// let patient = RetryPolicy {
///     max_attempts: 5,
///     initial_delay: Duration::from_millis(250),
///     max_delay: Duration::from_secs(10),
///     backoff_multiplier: 2.0,
/// };
/// assert!(patient.max_attempts > policy.max_attempts);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts in total, the first one included. Defaults to 3.
    pub max_attempts: u32,
    /// Wait before the second attempt. Defaults to 100ms.
    pub initial_delay: Duration,
    /// Longest single wait. Defaults to 5s.
    pub max_delay: Duration,
    /// Growth factor between waits. Defaults to 2.0.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Same as [`RetryPolicy::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default timings with a different attempt budget.
    ///
    /// # Examples
    ///
    /// ```
    /// use bol_api::reliability::RetryPolicy;
    ///
    /// let policy = RetryPolicy::with_max_attempts(5);
    /// assert_eq!(policy.max_attempts, 5);
    /// ```
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts, ..Self::default() }
    }

    /// Single attempt, no backoff.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::with_max_attempts(1)
    }

    /// Wait after the failure of attempt `failed` (counted from 0).
    pub(crate) fn delay_for_attempt(&self, failed: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(i32::try_from(failed).unwrap_or(i32::MAX));
        #[allow(clippy::cast_precision_loss, reason = "millisecond delays stay far below 2^52")]
        let scaled_ms = self.initial_delay.as_millis() as f64 * factor;
        #[allow(clippy::cast_precision_loss, reason = "same bound as above")]
        let cap_ms = self.max_delay.as_millis() as f64;
        if !scaled_ms.is_finite() || scaled_ms >= cap_ms {
            return self.max_delay;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "scaled_ms is finite and below the cap"
        )]
        let millis = scaled_ms.max(0.0).round() as u64;
        Duration::from_millis(millis).min(self.max_delay)
    }
}

/// Runs `operation`, repeating it while `should_retry` approves the error and the policy has
/// attempts left.
///
/// `max_attempts == 0` is treated as 1.
///
/// # Examples
///
/// ```
/// use std::sync::{
///     Arc,
///     atomic::{AtomicU32, Ordering},
/// };
///
/// use bol_api::reliability::{RetryPolicy, retry_with_backoff};
///
/// # async fn example() -> Result<String, String> {
/// let policy = RetryPolicy::default();
/// let attempt = Arc::new(AtomicU32::new(0));
///
/// let result = retry_with_backoff(&policy, |_: &String| true, || {
///     let attempt = Arc::clone(&attempt);
///     async move {
///         let n = attempt.fetch_add(1, Ordering::Relaxed);
///         if n < 2 { Err("temporary failure".to_string()) } else { Ok("success".to_string()) }
///     }
/// })
/// .await?;
///
/// assert_eq!(result, "success");
/// # Ok(result)
/// # }
/// ```
///
/// # Errors
///
/// The first error `should_retry` declines, or the error of the final attempt.
pub async fn retry_with_backoff<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "call recovered");
                }
                return Ok(value);
            }
            Err(error) => {
                let retryable = should_retry(&error);
                if !retryable || attempt + 1 >= max_attempts {
                    if retryable {
                        tracing::warn!(attempts = max_attempts, error = %error, "giving up");
                    }
                    return Err(error);
                }

                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "no response, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// `true` for reqwest timeouts and connect failures, the cases where bol.com never saw
/// the request or never answered it.
///
/// # Examples
///
/// ```
/// use bol_api::{ApiError, reliability::is_retryable};
///
/// let error = ApiError::InvalidInput("unknown option".to_string());
/// assert!(!is_retryable(&error));
/// ```
#[must_use]
#[allow(clippy::match_same_arms, reason = "answered calls are called out separately")]
pub fn is_retryable(error: &ApiError) -> bool {
    match error {
        ApiError::Transport(e) => e.is_timeout() || e.is_connect(),
        // The server answered; replaying could duplicate a write.
        ApiError::Marketplace(_) => false,
        ApiError::Coercion(_)
        | ApiError::MissingRequiredField { .. }
        | ApiError::TransportMessage(_)
        | ApiError::Document { .. }
        | ApiError::Auth(_)
        | ApiError::InvalidInput(_)
        | ApiError::Config(_) => false,
    }
}
