use std::time::{Duration, Instant};

use gridlink_serde::MTU_SIZE_BYTES;

/// Byte budget of one throttle category.
///
/// Tokens stay within `0..=capacity`. A rate change is staged and only
/// applied on the next refill.
#[derive(Clone, Debug)]
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    rate: f64,
    burst: Duration,
    staged_rate: Option<f64>,
    last_refill: Instant,
}

impl TokenBucket {
    /// Starts full
    pub fn new(rate: f64, burst: Duration, now: Instant) -> Self {
        let capacity = Self::capacity_for(rate, burst);
        Self {
            capacity,
            tokens: capacity,
            rate,
            burst,
            staged_rate: None,
            last_refill: now,
        }
    }

    /// Never below one MTU, so any single datagram can eventually pass
    fn capacity_for(rate: f64, burst: Duration) -> f64 {
        (rate * burst.as_secs_f64()).max(MTU_SIZE_BYTES as f64)
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    pub fn rate(&self) -> f64 {
        self.staged_rate.unwrap_or(self.rate)
    }

    pub fn stage_rate(&mut self, rate: f64) {
        self.staged_rate = Some(rate);
    }

    /// Credits time elapsed since the last refill at the current rate, then
    /// applies any staged rate
    pub fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + self.rate * elapsed.as_secs_f64()).min(self.capacity);
        self.last_refill = now.max(self.last_refill);

        if let Some(rate) = self.staged_rate.take() {
            self.rate = rate;
            self.capacity = Self::capacity_for(rate, self.burst);
            self.tokens = self.tokens.min(self.capacity);
        }
    }

    pub fn can_consume(&self, bytes: usize) -> bool {
        self.tokens >= bytes as f64
    }

    /// Deducts `bytes` if enough tokens are available
    pub fn try_consume(&mut self, bytes: usize) -> bool {
        if !self.can_consume(bytes) {
            return false;
        }
        self.tokens -= bytes as f64;
        true
    }
}
