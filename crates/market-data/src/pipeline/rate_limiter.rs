//! Request pacing per provider.
//!
//! One token bucket per provider ID, sized from the provider's
//! [`RateLimit`]: `burst` requests go out back to back, after that tokens
//! refill at `requests_per_minute`. Time is read from `tokio::time`, so a
//! paused test clock drives refills deterministically.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use crate::provider::RateLimit;

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    /// Tokens per second
    rate: f64,
    capacity: f64,
}

impl TokenBucket {
    fn new(limit: &RateLimit) -> Self {
        let capacity = f64::from(limit.burst.max(1));
        Self {
            tokens: capacity,
            last_refill: Instant::now(),
            rate: f64::from(limit.requests_per_minute) / 60.0,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Takes a token, or returns how long until one is available.
    fn take(&mut self) -> Result<(), Duration> {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return Ok(());
        }
        // a zero rate never refills; pace nothing rather than hang
        if self.rate <= 0.0 {
            return Ok(());
        }
        Err(Duration::from_secs_f64((1.0 - self.tokens) / self.rate))
    }
}

/// Token bucket rate limiter shared by the pipeline and lookups.
///
/// Providers that were never configured get [`RateLimit::default`].
#[derive(Default)]
pub struct RateLimiter {
    limits: Mutex<HashMap<String, RateLimit>>,
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    // the worst case after a poisoned lock is slightly wrong pacing
    fn lock_buckets(&self) -> MutexGuard<'_, HashMap<String, TokenBucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter buckets mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_limits(&self) -> MutexGuard<'_, HashMap<String, RateLimit>> {
        self.limits.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter limits mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Sets the limit for `provider`, starting it with a full bucket.
    pub fn configure(&self, provider: &str, limit: &RateLimit) {
        self.lock_limits().insert(provider.to_string(), limit.clone());
        self.lock_buckets().remove(provider);
    }

    fn new_bucket(&self, provider: &str) -> TokenBucket {
        match self.lock_limits().get(provider) {
            Some(limit) => TokenBucket::new(limit),
            None => TokenBucket::new(&RateLimit::default()),
        }
    }

    /// Waits until `provider` may be called once more.
    pub async fn acquire(&self, provider: &str) {
        loop {
            let wait = {
                let mut buckets = self.lock_buckets();
                let bucket = buckets
                    .entry(provider.to_string())
                    .or_insert_with(|| self.new_bucket(provider));
                match bucket.take() {
                    Ok(()) => return,
                    Err(wait) => wait,
                }
            };

            debug!("Rate limiter: waiting {:?} for provider '{}'", wait, provider);
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(requests_per_minute: u32, burst: u32) -> RateLimit {
        RateLimit {
            requests_per_minute,
            burst,
            max_page_size: 250,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_paced() {
        let limiter = RateLimiter::new();
        limiter.configure("SLOW", &limit(30, 3));
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire("SLOW").await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire("SLOW").await;
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bucket_refills_while_idle() {
        let limiter = RateLimiter::new();
        limiter.configure("SLOW", &limit(60, 1));

        limiter.acquire("SLOW").await;
        tokio::time::advance(Duration::from_secs(5)).await;

        let resumed = Instant::now();
        limiter.acquire("SLOW").await;
        assert_eq!(resumed.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_providers_paced_independently() {
        let limiter = RateLimiter::new();
        limiter.configure("A", &limit(6, 1));
        limiter.configure("B", &limit(6, 1));
        let start = Instant::now();

        limiter.acquire("A").await;
        limiter.acquire("B").await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_provider_uses_default_burst() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..RateLimit::default().burst {
            limiter.acquire("UNKNOWN").await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire("UNKNOWN").await;
        assert!(start.elapsed() > Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rate_does_not_block() {
        let limiter = RateLimiter::new();
        limiter.configure("FREE", &limit(0, 1));
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire("FREE").await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
