//! Configuration types for the Flock SDK.

use flock_core::limiter::{DEFAULT_LIMIT, DEFAULT_WINDOW};
use std::time::Duration;
use url::Url;

/// Credentials attached to every request.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// HTTP Basic pair: application client id + secret.
    Basic { client_id: String, secret: String },
    /// OAuth bearer token.
    Bearer(String),
}

/// Configuration for the Flock client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the people API, e.g.
    /// `https://api.planningcenteronline.com/people/v2/`.
    pub base_url: Url,
    /// Credentials for the remote API. `None` puts the client in degraded
    /// demo mode: every call fails `Unauthenticated` before any network I/O.
    pub credentials: Option<Credentials>,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry behavior.
    pub retry: RetryConfig,
    /// Local rate limiting.
    pub rate_limit: RateLimitConfig,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            credentials: None,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Local sliding-window rate limit settings.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed inside one window.
    pub limit: usize,
    /// Window length.
    pub window: Duration,
    /// Longest a dispatch waits for window capacity before the rejection
    /// is surfaced to the caller. One full window by default, so a steady
    /// caller is paced rather than failed.
    pub max_wait: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window: DEFAULT_WINDOW,
            max_wait: DEFAULT_WINDOW,
        }
    }
}

/// Configuration for retry behavior, per failure class.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts for a request the remote answers 429
    /// (clock skew or a shared quota can trip the remote limit even under
    /// local limiting). The first try counts.
    pub rate_limit_attempts: u32,
    /// Fallback delay when a 429 carries no usable `Retry-After` header.
    pub rate_limit_backoff: Duration,
    /// Retries after a 5xx response.
    pub server_error_retries: u32,
    /// Retries after a network-level failure (timeout, reset).
    pub network_retries: u32,
    /// Initial backoff duration, doubled per attempt.
    pub initial_backoff: Duration,
    /// Backoff ceiling.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            rate_limit_attempts: 3,
            rate_limit_backoff: Duration::from_secs(2),
            server_error_retries: 2,
            network_retries: 1,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Create a configuration that never retries.
    pub fn no_retry() -> Self {
        Self {
            rate_limit_attempts: 1,
            server_error_retries: 0,
            network_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff = self.initial_backoff.saturating_mul(2u32.saturating_pow(attempt));
        std::cmp::min(backoff, self.max_backoff)
    }
}
