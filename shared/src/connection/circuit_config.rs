use std::{default::Default, time::Duration};

/// What happens when a reliable packet runs out of resends
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetransmitPolicy {
    /// Abandon the packet, flag the circuit as degraded and keep it open
    ContinueBestEffort,
    /// Abandon the packet and close the circuit
    CloseCircuit,
}

/// Contains Config properties which will be used by every circuit
#[derive(Clone, Debug)]
pub struct CircuitConfig {
    /// How long a circuit may wait for `UseCircuitCode` once issued
    pub handshake_timeout: Duration,
    /// Expected interval of viewer traffic on an idle circuit
    pub keepalive_interval: Duration,
    /// Circuit is closed after this long without any inbound packet
    pub inactivity_timeout: Duration,
    /// Longest a logging out circuit waits for its pending acks
    pub drain_timeout: Duration,
    /// Reliable packets not acked within this interval are resent
    pub resend_interval: Duration,
    /// Resends of one packet before it is abandoned
    pub max_resends: u8,
    pub retransmit_policy: RetransmitPolicy,
    /// Longest an outgoing ack waits for a packet to ride on
    pub ack_flush_delay: Duration,
    /// Upper bound of acks appended to a single outgoing packet
    pub max_piggyback_acks: usize,
    /// Trust violations tolerated before the circuit is closed
    pub max_trust_violations: u32,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        let keepalive_interval = Duration::from_secs(15);
        Self {
            handshake_timeout: Duration::from_secs(30),
            keepalive_interval,
            inactivity_timeout: keepalive_interval * 4,
            drain_timeout: Duration::from_secs(5),
            resend_interval: Duration::from_secs(1),
            max_resends: 3,
            retransmit_policy: RetransmitPolicy::ContinueBestEffort,
            ack_flush_delay: Duration::from_millis(100),
            max_piggyback_acks: 64,
            max_trust_violations: 16,
        }
    }
}
