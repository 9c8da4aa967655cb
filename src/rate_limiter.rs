//! Token-bucket admission gate for outbound classification calls.
//!
//! The bucket holds up to `rate` tokens and refills continuously at
//! `rate / per` tokens per second. Each `acquire()` consumes one token, or
//! suspends the caller until one has accrued.
//!
//! The guard is a `tokio::sync::Mutex`, which hands the lock to waiters in
//! the order they queued. It stays held across the wait, so callers are
//! admitted strictly in arrival order.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Token-bucket rate limiter with continuous replenishment.
pub struct RateLimiter {
    rate: f64,
    per: Duration,
    state: Mutex<Bucket>,
}

struct Bucket {
    /// Tokens currently available, always within `[0, rate]`.
    allowance: f64,
    /// Last replenishment point. Only moves forward.
    last_check: Instant,
}

impl RateLimiter {
    /// Create a limiter admitting at most `rate` calls per `per`.
    ///
    /// The bucket starts full.
    pub fn new(rate: u32, per: Duration) -> Self {
        let rate = f64::from(rate);
        Self {
            rate,
            per,
            state: Mutex::new(Bucket {
                allowance: rate,
                last_check: Instant::now(),
            }),
        }
    }

    /// Tokens accrued per second.
    fn refill_per_sec(&self) -> f64 {
        self.rate / self.per.as_secs_f64()
    }

    /// Wait for a token, then consume it.
    pub async fn acquire(&self) {
        let mut bucket = self.state.lock().await;

        let now = Instant::now();
        let elapsed = now.saturating_duration_since(bucket.last_check);
        bucket.last_check = now;
        bucket.allowance =
            (bucket.allowance + elapsed.as_secs_f64() * self.refill_per_sec()).min(self.rate);

        if bucket.allowance < 1.0 {
            let wait = Duration::from_secs_f64((1.0 - bucket.allowance) / self.refill_per_sec());
            debug!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting for token");
            tokio::time::sleep(wait).await;
            // The token accrued during the wait is consumed here; any
            // fractional surplus is dropped.
            bucket.allowance = 0.0;
            bucket.last_check = bucket.last_check.max(Instant::now());
        } else {
            bucket.allowance -= 1.0;
        }
    }

    /// Tokens that would be available to a caller arriving now.
    ///
    /// Read-only: does not advance the bucket's replenishment point.
    pub async fn available_tokens(&self) -> f64 {
        let bucket = self.state.lock().await;
        let elapsed = Instant::now().saturating_duration_since(bucket.last_check);
        (bucket.allowance + elapsed.as_secs_f64() * self.refill_per_sec()).min(self.rate)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate", &self.rate)
            .field("per", &self.per)
            .finish_non_exhaustive()
    }
}
