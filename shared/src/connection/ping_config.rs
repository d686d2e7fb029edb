use std::time::Duration;

/// Contains Config properties which will be used by a circuit to measure
/// round trip time
#[derive(Clone, Debug)]
pub struct PingConfig {
    /// The interval between each `StartPingCheck` sent to the viewer
    pub ping_interval: Duration,
    /// Round trip time assumed before the first sample arrives
    pub rtt_initial_estimate: Duration,
    /// Weight of each new sample in the moving average, `0.0..=1.0`
    pub rtt_smoothing_factor: f32,
    /// Pings older than this are forgotten
    pub ping_timeout: Duration,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(5),
            rtt_initial_estimate: Duration::from_millis(200),
            rtt_smoothing_factor: 0.125,
            ping_timeout: Duration::from_secs(20),
        }
    }
}
