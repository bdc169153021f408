//! Connection settings for [`HttpTransport`](super::HttpTransport).
//!
//! Read from the `[http]` table of the client config. Every key is optional.

use std::time::Duration;

use serde::Deserialize;

use crate::{
    error::{ApiError, Result},
    reliability::RetryPolicy,
};

/// Pool, timeout and protocol settings plus the retry policy for transport failures.
///
/// # Examples
///
/// ```toml
/// [http]
/// timeout_secs = 20
/// http_version = "http1"
///
/// [http.retry]
/// max_attempts = 4
/// initial_delay_ms = 250
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HttpConfig {
    /// Idle keep-alive connections kept per marketplace host.
    #[serde(default = "default_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// Whole-request deadline, in seconds.
    #[serde(default = "default_request_secs")]
    pub timeout_secs: u64,

    /// TCP plus TLS handshake deadline, in seconds.
    #[serde(default = "default_connect_secs")]
    pub connect_timeout_secs: u64,

    /// Protocol negotiation.
    #[serde(default)]
    pub http_version: HttpVersion,

    /// Retry of transport-level failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: default_idle_per_host(),
            timeout_secs: default_request_secs(),
            connect_timeout_secs: default_connect_secs(),
            http_version: HttpVersion::Auto,
            retry: RetryConfig::default(),
        }
    }
}

impl HttpConfig {
    /// Checks every setting against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if:
    /// - `timeout_secs` is outside 1-300 seconds
    /// - `connect_timeout_secs` is outside 1-60 seconds
    /// - `retry.max_attempts` is outside 1-10
    /// - `retry.backoff_multiplier` is below 1.0 or not finite
    pub fn validate(&self) -> Result<()> {
        if !(1..=300).contains(&self.timeout_secs) {
            return Err(ApiError::Config(format!(
                "timeout_secs = {} is outside 1..=300",
                self.timeout_secs
            )));
        }
        if !(1..=60).contains(&self.connect_timeout_secs) {
            return Err(ApiError::Config(format!(
                "connect_timeout_secs = {} is outside 1..=60",
                self.connect_timeout_secs
            )));
        }
        self.retry.validate()
    }

    /// Whole-request deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Handshake deadline.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Which HTTP protocol the client speaks.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HttpVersion {
    /// Always HTTP/1.1.
    Http1,
    /// HTTP/2 without an upgrade round trip.
    Http2,
    /// Let ALPN decide.
    #[default]
    Auto,
}

/// Retry settings in TOML-friendly units.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff delay in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Backoff cap in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Growth factor between delays.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(ApiError::Config("retry.max_attempts must be between 1 and 10".to_owned()));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ApiError::Config(
                "retry.backoff_multiplier must be at least 1.0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Converts to the policy used at runtime.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

const fn default_idle_per_host() -> usize {
    100
}

const fn default_request_secs() -> u64 {
    30
}

const fn default_connect_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    5_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}
