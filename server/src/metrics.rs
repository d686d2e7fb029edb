use parking_lot::Mutex;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::stats::StatsSnapshot;

/// Mirrors `TransportStats` into a prometheus registry as
/// `gridlink_transport_total{counter="..."}`
pub struct PrometheusStats {
    counters: IntCounterVec,
    exported: Mutex<StatsSnapshot>,
}

impl PrometheusStats {
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let counters = IntCounterVec::new(
            Opts::new(
                "gridlink_transport_total",
                "Packets, bytes and drops counted by the gridlink transport",
            ),
            &["counter"],
        )?;
        registry.register(Box::new(counters.clone()))?;
        Ok(Self {
            counters,
            exported: Mutex::new(StatsSnapshot::default()),
        })
    }

    /// Adds whatever the counters gained since the last export
    pub fn export(&self, snapshot: &StatsSnapshot) {
        let mut exported = self.exported.lock();
        let previous = exported.counters();
        for ((name, value), (_, before)) in snapshot.counters().into_iter().zip(previous) {
            if value > before {
                self.counters
                    .with_label_values(&[name])
                    .inc_by(value - before);
            }
        }
        *exported = *snapshot;
    }

    pub fn value(&self, counter: &str) -> u64 {
        self.counters.with_label_values(&[counter]).get()
    }
}
