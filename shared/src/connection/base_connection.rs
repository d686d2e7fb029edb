use std::{collections::VecDeque, time::Instant};

use log::{trace, warn};

use gridlink_serde::MTU_SIZE_BYTES;

use crate::{
    connection::{
        ack_manager::{AckManager, ExhaustedSend},
        circuit_config::CircuitConfig,
        inbound_window::{InboundClass, InboundWindow},
        ping_config::PingConfig,
        ping_manager::PingManager,
        throttle::{Throttle, ThrottleCategory, ThrottleConfig, ThrottleError, TokenBucket},
    },
    messages::{
        builtin::{CompletePingCheck, PacketAck, StartPingCheck},
        error::MessageError,
        message_container::MessageContainer,
        message_kinds::MessageKinds,
    },
    packet::{Packet, PacketFlags, ACK_SIZE, MAX_APPENDED_ACKS},
    types::SequenceNumber,
};

/// An encoded datagram waiting in the throttle or the ready queue. Acks are
/// appended only when it actually leaves.
struct OutgoingPacket {
    sequence: SequenceNumber,
    flags: PacketFlags,
    bytes: Vec<u8>,
    /// Most acks it may carry. Throttled packets paid for this room up front.
    ack_room: usize,
}

impl OutgoingPacket {
    fn new(
        sequence: SequenceNumber,
        flags: PacketFlags,
        bytes: Vec<u8>,
        ack_room: usize,
    ) -> Self {
        Self {
            sequence,
            flags,
            bytes,
            ack_room,
        }
    }
}

/// Bytes a throttled datagram is charged: its own length plus room for
/// piggybacked acks, never more than one MTU. Returns the charge and how
/// many acks that room holds.
fn throttle_charge(length: usize, max_piggyback_acks: usize) -> (usize, usize) {
    let wanted = max_piggyback_acks.min(MAX_APPENDED_ACKS);
    if wanted == 0 {
        return (length, 0);
    }
    let room = MTU_SIZE_BYTES.saturating_sub(length + 1) / ACK_SIZE;
    let acks = wanted.min(room);
    if acks == 0 {
        return (length, 0);
    }
    (length + acks * ACK_SIZE + 1, acks)
}

/// Outcome of handing a message to the connection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedMessage {
    pub sequence: SequenceNumber,
    pub reliable: bool,
    /// Waiting for throttle tokens instead of going out on the next drain
    pub throttled: bool,
}

#[derive(Debug, Default)]
pub struct ResendReport {
    pub queued: usize,
    /// Packets that ran out of resends and were abandoned
    pub exhausted: Vec<ExhaustedSend>,
}

/// Per-circuit wire state: sequence numbers, inbound duplicate window,
/// pending and owed acks, throttle and ping
pub struct BaseConnection {
    config: CircuitConfig,
    ack_manager: AckManager,
    inbound_window: InboundWindow,
    throttle: Throttle<OutgoingPacket>,
    ready: VecDeque<OutgoingPacket>,
    pub ping_manager: PingManager,
    last_received: Instant,
}

impl BaseConnection {
    pub fn new(
        config: &CircuitConfig,
        throttle_config: &ThrottleConfig,
        ping_config: &PingConfig,
        now: Instant,
    ) -> Self {
        Self {
            config: config.clone(),
            ack_manager: AckManager::new(),
            inbound_window: InboundWindow::new(),
            throttle: Throttle::new(throttle_config, now),
            ready: VecDeque::new(),
            ping_manager: PingManager::new(ping_config, now),
            last_received: now,
        }
    }

    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    // Incoming

    /// Consumes the packet's appended acks and records its sequence.
    ///
    /// Every reliable packet that is not stale is owed an ack, including
    /// duplicates.
    pub fn process_incoming(&mut self, packet: &Packet, now: Instant) -> InboundClass {
        self.last_received = now;
        if !packet.acks.is_empty() {
            self.ack_manager.process_incoming_acks(&packet.acks);
        }
        let class = self.inbound_window.record(packet.sequence);
        if packet.is_reliable() && class != InboundClass::Stale {
            self.ack_manager.queue_ack(packet.sequence, now);
        }
        class
    }

    pub fn process_packet_ack(&mut self, ack: &PacketAck) -> usize {
        self.ack_manager.process_incoming_acks(ack.ids())
    }

    pub fn process_pong(&mut self, pong: &CompletePingCheck, now: Instant) {
        if let Some(sample) = self.ping_manager.process_pong(pong, now) {
            trace!("ping {} round trip {:?}", pong.ping_id, sample);
        }
    }

    pub fn last_received(&self) -> Instant {
        self.last_received
    }

    // Outgoing

    /// Encodes `message`, tracks it if reliable and hands it to the throttle
    pub fn queue_message(
        &mut self,
        message_kinds: &MessageKinds,
        message: &MessageContainer,
        now: Instant,
    ) -> Result<QueuedMessage, MessageError> {
        let sequence = self.ack_manager.peek_outgoing_sequence();
        let packet = message_kinds.packet_for(message, sequence)?;
        let bytes = packet.encode()?;
        self.ack_manager.next_outgoing_sequence();

        let flags = packet.flags;
        if packet.is_reliable() {
            if let Err(error) = self.ack_manager.track_reliable(packet, message.name()) {
                warn!("{}: {}", message.name(), error);
            }
        }

        let mut throttled = false;
        match message.throttle_category() {
            None => {
                let outgoing =
                    OutgoingPacket::new(sequence, flags, bytes, self.config.max_piggyback_acks);
                self.ready.push_back(outgoing);
            }
            Some(category) => {
                let (size, ack_room) =
                    throttle_charge(bytes.len(), self.config.max_piggyback_acks);
                let outgoing = OutgoingPacket::new(sequence, flags, bytes, ack_room);
                match self.throttle.push(category, size, outgoing, now) {
                    Some(outgoing) => self.ready.push_back(outgoing),
                    None => throttled = true,
                }
            }
        }
        Ok(QueuedMessage {
            sequence,
            reliable: flags.is_reliable(),
            throttled,
        })
    }

    /// Queues resends of every reliable packet past its resend interval, in
    /// the resend category
    pub fn collect_resends(&mut self, now: Instant) -> ResendReport {
        let (resends, exhausted) = self.ack_manager.collect_resends(
            now,
            self.config.resend_interval,
            self.config.max_resends,
        );
        let queued = resends.len();
        for packet in resends {
            let bytes = match packet.encode() {
                Ok(bytes) => bytes,
                Err(error) => {
                    warn!("dropping resend of {}: {}", packet.sequence, error);
                    continue;
                }
            };
            let (size, ack_room) = throttle_charge(bytes.len(), self.config.max_piggyback_acks);
            let outgoing = OutgoingPacket::new(packet.sequence, packet.flags, bytes, ack_room);
            if let Some(outgoing) = self.throttle.push(ThrottleCategory::Resend, size, outgoing, now)
            {
                self.ready.push_back(outgoing);
            }
        }
        ResendReport { queued, exhausted }
    }

    /// Applies new throttle rates on the next refill
    pub fn stage_throttle(
        &mut self,
        rates: &[f32; ThrottleCategory::COUNT],
    ) -> Result<(), ThrottleError> {
        self.throttle.stage_rates(rates)
    }

    pub fn throttle_bucket(&self, category: ThrottleCategory) -> &TokenBucket {
        self.throttle.bucket(category)
    }

    pub fn throttle_queued(&self, category: ThrottleCategory) -> usize {
        self.throttle.queued(category)
    }

    /// Everything allowed on the wire right now, with owed acks appended.
    /// A standalone `PacketAck` follows when acks have waited too long.
    pub fn drain_outgoing(&mut self, message_kinds: &MessageKinds, now: Instant) -> Vec<Vec<u8>> {
        for (_, outgoing) in self.throttle.release(now) {
            self.ready.push_back(outgoing);
        }

        let mut datagrams = Vec::with_capacity(self.ready.len());
        while let Some(mut outgoing) = self.ready.pop_front() {
            if outgoing.flags.is_reliable() {
                let still_pending = self.ack_manager.mark_sent(outgoing.sequence, now);
                if !still_pending && outgoing.flags.is_resent() {
                    // acked while it waited in the throttle
                    continue;
                }
            }
            let appended = Packet::append_acks(
                &mut outgoing.bytes,
                self.ack_manager.outgoing_acks(),
                outgoing.ack_room,
            );
            if appended > 0 {
                self.ack_manager.consume_outgoing_acks(appended, now);
            }
            datagrams.push(outgoing.bytes);
        }

        if self
            .ack_manager
            .should_flush_acks(now, self.config.ack_flush_delay)
        {
            while self.ack_manager.has_outgoing_acks() {
                match self.build_standalone_ack(message_kinds) {
                    Ok((bytes, count)) => {
                        datagrams.push(bytes);
                        self.ack_manager.consume_outgoing_acks(count, now);
                    }
                    Err(error) => {
                        warn!("failed to build PacketAck: {}", error);
                        break;
                    }
                }
            }
        }

        datagrams
    }

    fn build_standalone_ack(
        &mut self,
        message_kinds: &MessageKinds,
    ) -> Result<(Vec<u8>, usize), MessageError> {
        let owed = self.ack_manager.outgoing_acks();
        let ids = owed[..owed.len().min(PacketAck::MAX_IDS)].to_vec();
        let count = ids.len();
        let ack = PacketAck::new(ids).unwrap_or_default();
        let sequence = self.ack_manager.next_outgoing_sequence();
        let message = MessageContainer::new(ack);
        let bytes = message_kinds.build_packet(&message, PacketFlags::NONE, sequence, &[])?;
        Ok((bytes, count))
    }

    // Ping

    pub fn should_send_ping(&self, now: Instant) -> bool {
        self.ping_manager.should_send_ping(now)
    }

    pub fn start_ping(&mut self, now: Instant) -> StartPingCheck {
        let oldest_unacked = self
            .ack_manager
            .oldest_unacked()
            .unwrap_or_else(|| self.ack_manager.peek_outgoing_sequence());
        self.ping_manager.start_ping(oldest_unacked, now)
    }

    // Bookkeeping

    pub fn ack_manager(&self) -> &AckManager {
        &self.ack_manager
    }

    pub fn has_pending_acks(&self) -> bool {
        self.ack_manager.has_pending()
    }

    pub fn has_queued_outgoing(&self) -> bool {
        !self.ready.is_empty() || self.throttle.total_queued() > 0
    }

    /// Forgets every pending resend, owed ack and queued packet
    pub fn clear(&mut self) {
        self.ack_manager.clear();
        self.throttle.clear();
        self.ready.clear();
        self.inbound_window.clear();
    }
}
