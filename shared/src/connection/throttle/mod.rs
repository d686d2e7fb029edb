//! Per-category token buckets gating what a circuit may put on the wire.
//!
//! Each category owns a FIFO of packets waiting for tokens. Categories never
//! wait on each other.

mod category;
mod error;
mod throttle_config;
mod token_bucket;

use std::{collections::VecDeque, time::Instant};

use log::trace;

pub use category::ThrottleCategory;
pub use error::ThrottleError;
pub use throttle_config::ThrottleConfig;
pub use token_bucket::TokenBucket;

pub struct Throttle<T> {
    buckets: Vec<TokenBucket>,
    queues: Vec<VecDeque<(usize, T)>>,
    min_rate: f32,
    max_rate: f32,
}

impl<T> Throttle<T> {
    pub fn new(config: &ThrottleConfig, now: Instant) -> Self {
        let buckets = ThrottleCategory::ALL
            .iter()
            .map(|category| {
                let rate = config.rate(*category).clamp(config.min_rate, config.max_rate);
                TokenBucket::new(rate as f64, config.burst, now)
            })
            .collect();
        let queues = ThrottleCategory::ALL.iter().map(|_| VecDeque::new()).collect();
        Self {
            buckets,
            queues,
            min_rate: config.min_rate,
            max_rate: config.max_rate,
        }
    }

    pub fn bucket(&self, category: ThrottleCategory) -> &TokenBucket {
        &self.buckets[category.index()]
    }

    pub fn queued(&self, category: ThrottleCategory) -> usize {
        self.queues[category.index()].len()
    }

    pub fn total_queued(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// Offers `item` of `size` bytes for sending.
    ///
    /// Returns it back when it may go out right away. Otherwise it waits
    /// behind whatever is already queued in the same category.
    pub fn push(
        &mut self,
        category: ThrottleCategory,
        size: usize,
        item: T,
        now: Instant,
    ) -> Option<T> {
        let index = category.index();
        let bucket = &mut self.buckets[index];
        bucket.refill(now);
        if self.queues[index].is_empty() && bucket.try_consume(size) {
            return Some(item);
        }
        trace!(
            "throttle: queued {} bytes in the {} category",
            size,
            category.name()
        );
        self.queues[index].push_back((size, item));
        None
    }

    /// Refills every bucket and releases queued items, oldest first, for as
    /// long as each category has tokens for its head item
    pub fn release(&mut self, now: Instant) -> Vec<(ThrottleCategory, T)> {
        let mut released = Vec::new();
        for category in ThrottleCategory::ALL {
            let index = category.index();
            let bucket = &mut self.buckets[index];
            bucket.refill(now);
            let queue = &mut self.queues[index];
            while let Some((size, _)) = queue.front() {
                if !bucket.try_consume(*size) {
                    break;
                }
                if let Some((_, item)) = queue.pop_front() {
                    released.push((category, item));
                }
            }
        }
        released
    }

    /// Stages a new rate per category, in bytes per second. Takes effect on
    /// the next refill, queued items stay where they are.
    pub fn stage_rates(
        &mut self,
        rates: &[f32; ThrottleCategory::COUNT],
    ) -> Result<(), ThrottleError> {
        for (category, rate) in ThrottleCategory::ALL.iter().zip(rates.iter()) {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(ThrottleError::InvalidRate {
                    category: *category,
                    rate: *rate,
                });
            }
        }
        for (bucket, rate) in self.buckets.iter_mut().zip(rates.iter()) {
            let rate = rate.clamp(self.min_rate, self.max_rate);
            bucket.stage_rate(rate as f64);
        }
        Ok(())
    }

    /// Drops everything still queued
    pub fn clear(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
    }
}
