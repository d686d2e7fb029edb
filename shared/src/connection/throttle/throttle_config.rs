use std::time::Duration;

use crate::connection::throttle::ThrottleCategory;

#[derive(Clone, Debug)]
pub struct ThrottleConfig {
    /// Bytes per second, indexed by `ThrottleCategory::index`
    pub rates: [f32; ThrottleCategory::COUNT],
    /// How many seconds of traffic a full bucket holds
    pub burst: Duration,
    /// Requested rates are clamped into `min_rate..=max_rate`
    pub min_rate: f32,
    pub max_rate: f32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            rates: [15000.0, 17000.0, 1000.0, 1000.0, 28000.0, 28000.0, 28000.0],
            burst: Duration::from_secs(1),
            min_rate: 100.0,
            max_rate: 1_000_000.0,
        }
    }
}

impl ThrottleConfig {
    pub fn rate(&self, category: ThrottleCategory) -> f32 {
        self.rates[category.index()]
    }
}
