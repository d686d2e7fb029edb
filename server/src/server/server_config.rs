use std::default::Default;

use gridlink_shared::{CircuitConfig, PingConfig, ThrottleConfig};

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Used to configure every circuit
    pub circuit: CircuitConfig,
    /// Rates every circuit starts with, until its viewer sends
    /// `AgentThrottle`
    pub throttle: ThrottleConfig,
    /// Configuration used to monitor the round trip time of each circuit
    pub ping: PingConfig,
    /// Route alternate-transport messages to the event queue, when one is
    /// installed, instead of UDP
    pub prefer_event_queue: bool,
    /// Most `ServerEvent`s held for `take_events`. Once full, the oldest
    /// are dropped and counted in `dropped_events`.
    pub max_buffered_events: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            circuit: CircuitConfig::default(),
            throttle: ThrottleConfig::default(),
            ping: PingConfig::default(),
            prefer_event_queue: false,
            max_buffered_events: 4096,
        }
    }
}
