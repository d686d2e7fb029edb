use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use crate::{
    connection::{ping_config::PingConfig, timer::Timer},
    messages::builtin::{CompletePingCheck, StartPingCheck},
    types::{PingId, SequenceNumber},
};

/// Sends periodic pings and keeps a smoothed round trip time
pub struct PingManager {
    ping_timer: Timer,
    ping_timeout: Duration,
    smoothing: f32,
    next_ping_id: PingId,
    sent_pings: VecDeque<(PingId, Instant)>,
    /// Smoothed round trip time, in milliseconds
    pub rtt_average: f32,
}

impl PingManager {
    pub fn new(config: &PingConfig, now: Instant) -> Self {
        Self {
            ping_timer: Timer::new(config.ping_interval, now),
            ping_timeout: config.ping_timeout,
            smoothing: config.rtt_smoothing_factor.clamp(0.0, 1.0),
            next_ping_id: 0,
            sent_pings: VecDeque::new(),
            rtt_average: config.rtt_initial_estimate.as_secs_f32() * 1000.0,
        }
    }

    pub fn should_send_ping(&self, now: Instant) -> bool {
        self.ping_timer.ringing(now)
    }

    /// Builds the next ping and starts timing it
    pub fn start_ping(&mut self, oldest_unacked: SequenceNumber, now: Instant) -> StartPingCheck {
        self.ping_timer.reset(now);

        let ping_timeout = self.ping_timeout;
        self.sent_pings
            .retain(|(_, sent)| now.saturating_duration_since(*sent) < ping_timeout);

        let ping_id = self.next_ping_id;
        self.next_ping_id = self.next_ping_id.wrapping_add(1);
        self.sent_pings.retain(|(id, _)| *id != ping_id);
        self.sent_pings.push_back((ping_id, now));

        StartPingCheck {
            ping_id,
            oldest_unacked,
        }
    }

    /// Folds a reply into the average, returning the sample. Unknown or
    /// expired ids are ignored.
    pub fn process_pong(&mut self, pong: &CompletePingCheck, now: Instant) -> Option<Duration> {
        let index = self
            .sent_pings
            .iter()
            .position(|(id, _)| *id == pong.ping_id)?;
        let (_, sent) = self.sent_pings.remove(index)?;
        let sample = now.saturating_duration_since(sent);
        let sample_millis = sample.as_secs_f32() * 1000.0;
        self.rtt_average += (sample_millis - self.rtt_average) * self.smoothing;
        Some(sample)
    }

    /// Answer to a ping started by the other side
    pub fn reply_to(ping: &StartPingCheck) -> CompletePingCheck {
        CompletePingCheck {
            ping_id: ping.ping_id,
        }
    }

    pub fn rtt(&self) -> Duration {
        Duration::from_secs_f32(self.rtt_average.max(0.0) / 1000.0)
    }

    pub fn pending_pings(&self) -> usize {
        self.sent_pings.len()
    }
}
