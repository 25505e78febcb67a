//! Client-side sliding-window rate limiting.
//!
//! The remote API allows 100 requests per rolling 60-second interval. The
//! limiter records the timestamp of every granted request and prunes
//! entries older than the window on each check, so a burst straddling a
//! bucket boundary can never double-spend the allowance. Construct one
//! instance, share it behind an `Arc`, and gate every dispatch through it —
//! no request may reach the network without passing here first.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// The remote's published ceiling: 100 requests per minute.
pub const DEFAULT_LIMIT: usize = 100;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Admission denied: the window is full. `retry_after` is the time until
/// the oldest granted request leaves the window and one slot frees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rate limit of {limit} requests per {window:?} reached; capacity frees in {retry_after:?}")]
pub struct RateLimitExceeded {
    pub limit: usize,
    pub window: Duration,
    pub retry_after: Duration,
}

impl RateLimitExceeded {
    /// Seconds until capacity frees, rounded up so callers never retry early.
    pub fn retry_after_secs(&self) -> u64 {
        self.retry_after.as_millis().div_ceil(1000) as u64
    }
}

/// Sliding-window limiter over granted-request timestamps.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    granted: Mutex<VecDeque<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            granted: Mutex::new(VecDeque::with_capacity(limit)),
        }
    }

    /// Non-blocking admission check. Grants (recording the timestamp) or
    /// rejects; it never waits and never retries on its own — retry policy
    /// lives with the caller.
    pub fn try_admit(&self) -> Result<(), RateLimitExceeded> {
        let now = Instant::now();
        let mut granted = self.granted.lock().unwrap();

        while granted
            .front()
            .is_some_and(|&oldest| now.duration_since(oldest) >= self.window)
        {
            granted.pop_front();
        }

        if granted.len() < self.limit {
            granted.push_back(now);
            return Ok(());
        }

        let retry_after = granted
            .front()
            .map_or(self.window, |&oldest| {
                self.window - now.duration_since(oldest)
            });
        Err(RateLimitExceeded {
            limit: self.limit,
            window: self.window,
            retry_after,
        })
    }

    /// Blocking admission: suspends until a slot frees, bounded by
    /// `max_wait`. If the wait would exceed the bound the rejection is
    /// surfaced instead, carrying the remaining wait.
    pub async fn admit(&self, max_wait: Duration) -> Result<(), RateLimitExceeded> {
        let deadline = Instant::now() + max_wait;
        loop {
            let rejection = match self.try_admit() {
                Ok(()) => return Ok(()),
                Err(rejection) => rejection,
            };
            let wake = Instant::now() + rejection.retry_after;
            if wake > deadline {
                return Err(rejection);
            }
            tracing::debug!(
                wait_ms = rejection.retry_after.as_millis() as u64,
                "rate limit window full, waiting for capacity"
            );
            tokio::time::sleep_until(wake).await;
        }
    }

    /// Number of grants currently inside the window.
    pub fn in_flight(&self) -> usize {
        let now = Instant::now();
        let mut granted = self.granted.lock().unwrap();
        while granted
            .front()
            .is_some_and(|&oldest| now.duration_since(oldest) >= self.window)
        {
            granted.pop_front();
        }
        granted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn hundred_first_call_in_window_is_rejected() {
        let limiter = RateLimiter::default();
        for _ in 0..100 {
            limiter.try_admit().unwrap();
        }
        let rejection = limiter.try_admit().unwrap_err();
        assert_eq!(rejection.retry_after, Duration::from_secs(60));
        assert_eq!(rejection.retry_after_secs(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_tracks_the_oldest_grant() {
        let limiter = RateLimiter::default();
        limiter.try_admit().unwrap();
        advance(Duration::from_secs(30)).await;
        for _ in 0..99 {
            limiter.try_admit().unwrap();
        }

        // 60 - (now - oldest) with the oldest grant 30s back.
        let rejection = limiter.try_admit().unwrap_err();
        assert_eq!(rejection.retry_after, Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_restores_once_the_window_slides() {
        let limiter = RateLimiter::default();
        limiter.try_admit().unwrap();
        advance(Duration::from_secs(30)).await;
        for _ in 0..99 {
            limiter.try_admit().unwrap();
        }
        limiter.try_admit().unwrap_err();

        // The earliest grant ages out exactly at the window edge,
        // restoring capacity for one more call.
        advance(Duration::from_secs(30)).await;
        limiter.try_admit().unwrap();
        limiter.try_admit().unwrap_err();
    }

    #[tokio::test(start_paused = true)]
    async fn admit_blocks_until_a_slot_frees() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        limiter.try_admit().unwrap();

        let started = Instant::now();
        limiter.admit(Duration::from_secs(60)).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn admit_surfaces_rejection_past_the_bound() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        limiter.try_admit().unwrap();

        let rejection = limiter.admit(Duration::from_secs(5)).await.unwrap_err();
        assert_eq!(rejection.retry_after, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_prunes_expired_grants() {
        let limiter = RateLimiter::default();
        for _ in 0..10 {
            limiter.try_admit().unwrap();
        }
        assert_eq!(limiter.in_flight(), 10);
        advance(Duration::from_secs(61)).await;
        assert_eq!(limiter.in_flight(), 0);
    }
}
