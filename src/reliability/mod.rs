//! Retrying marketplace calls that never got an answer.

mod retry;

pub use retry::{RetryPolicy, is_retryable, retry_with_backoff};
