use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the transport counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub packets_in: u64,
    pub bytes_in: u64,
    pub packets_out: u64,
    pub bytes_out: u64,
    pub envelope_errors: u64,
    pub unknown_message_types: u64,
    pub decode_errors: u64,
    pub trust_violations: u64,
    pub handshake_failures: u64,
    pub duplicates: u64,
    pub stale_drops: u64,
    /// Reliable application messages dropped on a draining circuit
    pub drain_drops: u64,
    pub resends: u64,
    pub retransmit_exhaustions: u64,
    pub handler_failures: u64,
    pub throttled_sends: u64,
    pub send_errors: u64,
    /// Server events discarded because nobody drained the buffer
    pub dropped_events: u64,
}

macro_rules! counters {
    ($($name:ident => $increment:ident),* $(,)?) => {
        /// Transport counters, safe to bump from any thread
        #[derive(Debug, Default)]
        pub struct TransportStats {
            $($name: AtomicU64,)*
        }

        impl TransportStats {
            pub fn new() -> Self {
                Self::default()
            }

            $(
                pub fn $increment(&self, amount: u64) {
                    self.$name.fetch_add(amount, Ordering::Relaxed);
                }
            )*

            pub fn snapshot(&self) -> StatsSnapshot {
                StatsSnapshot {
                    $($name: self.$name.load(Ordering::Relaxed),)*
                }
            }
        }

        impl StatsSnapshot {
            /// Every counter with its name
            pub fn counters(&self) -> Vec<(&'static str, u64)> {
                vec![$((stringify!($name), self.$name),)*]
            }
        }
    };
}

counters! {
    packets_in => add_packets_in,
    bytes_in => add_bytes_in,
    packets_out => add_packets_out,
    bytes_out => add_bytes_out,
    envelope_errors => add_envelope_errors,
    unknown_message_types => add_unknown_message_types,
    decode_errors => add_decode_errors,
    trust_violations => add_trust_violations,
    handshake_failures => add_handshake_failures,
    duplicates => add_duplicates,
    stale_drops => add_stale_drops,
    drain_drops => add_drain_drops,
    resends => add_resends,
    retransmit_exhaustions => add_retransmit_exhaustions,
    handler_failures => add_handler_failures,
    throttled_sends => add_throttled_sends,
    send_errors => add_send_errors,
    dropped_events => add_dropped_events,
}
