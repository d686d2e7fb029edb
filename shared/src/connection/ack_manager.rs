use std::time::{Duration, Instant};

use crate::{
    packet::{Packet, PacketFlags},
    sequence_list::{SequenceError, SequenceList},
    types::SequenceNumber,
    wrapping_number::next_sequence,
};

/// A reliable packet the remote has not acknowledged yet
pub struct PendingAck {
    pub packet: Packet,
    pub name: &'static str,
    /// `None` while the packet still waits in the throttle
    pub send_time: Option<Instant>,
    pub retry_count: u8,
    /// A resend copy sits in the throttle
    pub queued_for_resend: bool,
}

/// A reliable packet abandoned after its last resend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExhaustedSend {
    pub sequence: SequenceNumber,
    pub name: &'static str,
    pub retry_count: u8,
}

/// Keeps track of sent reliable packets, resending them until acked, and of
/// received reliable packets still owed an ack
pub struct AckManager {
    next_sequence: SequenceNumber,
    pending: SequenceList<PendingAck>,
    outgoing_acks: Vec<SequenceNumber>,
    acks_waiting_since: Option<Instant>,
}

impl Default for AckManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AckManager {
    pub fn new() -> Self {
        Self {
            next_sequence: 1,
            pending: SequenceList::new(),
            outgoing_acks: Vec::new(),
            acks_waiting_since: None,
        }
    }

    // Outgoing sequence

    /// Hands out the sequence number for the next outgoing packet
    pub fn next_outgoing_sequence(&mut self) -> SequenceNumber {
        let sequence = self.next_sequence;
        self.next_sequence = next_sequence(sequence);
        sequence
    }

    /// Peeks the sequence number the next packet will get
    pub fn peek_outgoing_sequence(&self) -> SequenceNumber {
        self.next_sequence
    }

    // Pending acks

    /// Starts tracking a reliable packet. The resend clock starts at
    /// `mark_sent`.
    pub fn track_reliable(
        &mut self,
        packet: Packet,
        name: &'static str,
    ) -> Result<(), SequenceError> {
        let sequence = packet.sequence;
        self.pending.try_insert_scan_from_back(
            sequence,
            PendingAck {
                packet,
                name,
                send_time: None,
                retry_count: 0,
                queued_for_resend: false,
            },
        )
    }

    /// Records that a reliable packet actually left. Returns `false` if it
    /// was acked meanwhile.
    pub fn mark_sent(&mut self, sequence: SequenceNumber, now: Instant) -> bool {
        let Some(pending) = self.pending.get_mut_scan_from_back(&sequence) else {
            return false;
        };
        pending.send_time = Some(now);
        pending.queued_for_resend = false;
        true
    }

    pub fn is_pending(&self, sequence: SequenceNumber) -> bool {
        self.pending.contains_scan_from_back(&sequence)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &(SequenceNumber, PendingAck)> {
        self.pending.iter()
    }

    pub fn oldest_unacked(&self) -> Option<SequenceNumber> {
        self.pending.front().map(|(sequence, _)| *sequence)
    }

    /// Returns copies of every packet due for a resend, flagged `RESENT`,
    /// and removes the ones that are out of resends
    pub fn collect_resends(
        &mut self,
        now: Instant,
        resend_interval: Duration,
        max_resends: u8,
    ) -> (Vec<Packet>, Vec<ExhaustedSend>) {
        let is_due = |pending: &PendingAck| match pending.send_time {
            Some(sent) if !pending.queued_for_resend => {
                now.saturating_duration_since(sent) >= resend_interval
            }
            _ => false,
        };

        let exhausted = self
            .pending
            .drain_where(|_, pending| is_due(pending) && pending.retry_count >= max_resends)
            .into_iter()
            .map(|(sequence, pending)| ExhaustedSend {
                sequence,
                name: pending.name,
                retry_count: pending.retry_count,
            })
            .collect();

        let mut resends = Vec::new();
        for (_, pending) in self.pending.iter_mut() {
            if !is_due(&*pending) {
                continue;
            }
            pending.retry_count += 1;
            pending.queued_for_resend = true;
            let mut packet = pending.packet.clone();
            packet.flags.insert(PacketFlags::RESENT);
            packet.acks.clear();
            resends.push(packet);
        }

        (resends, exhausted)
    }

    /// Removes every pending packet named in `acks`.
    /// Acks for unknown sequence numbers are ignored.
    pub fn process_incoming_acks(&mut self, acks: &[SequenceNumber]) -> usize {
        acks.iter()
            .filter(|sequence| self.pending.remove_scan_from_front(*sequence).is_some())
            .count()
    }

    // Outgoing acks

    /// Owes the remote an ack for `sequence`. An ack already owed is not
    /// queued twice.
    pub fn queue_ack(&mut self, sequence: SequenceNumber, now: Instant) {
        if self.outgoing_acks.contains(&sequence) {
            return;
        }
        self.outgoing_acks.push(sequence);
        if self.acks_waiting_since.is_none() {
            self.acks_waiting_since = Some(now);
        }
    }

    pub fn outgoing_acks(&self) -> &[SequenceNumber] {
        &self.outgoing_acks
    }

    pub fn has_outgoing_acks(&self) -> bool {
        !self.outgoing_acks.is_empty()
    }

    /// Drops the first `count` owed acks once they have been written
    pub fn consume_outgoing_acks(&mut self, count: usize, now: Instant) {
        let count = count.min(self.outgoing_acks.len());
        self.outgoing_acks.drain(..count);
        self.acks_waiting_since = if self.outgoing_acks.is_empty() {
            None
        } else {
            Some(now)
        };
    }

    /// Whether owed acks have waited long enough for a ride
    pub fn should_flush_acks(&self, now: Instant, delay: Duration) -> bool {
        match self.acks_waiting_since {
            Some(since) => now.saturating_duration_since(since) >= delay,
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.outgoing_acks.clear();
        self.acks_waiting_since = None;
    }
}
