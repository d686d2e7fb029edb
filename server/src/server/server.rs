use std::{
    collections::VecDeque,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use log::{debug, info, trace, warn};
use parking_lot::{Mutex, RwLock};

use gridlink_shared::{
    builtin::{
        AgentThrottle, CloseCircuit, CompletePingCheck, KickUser, LogoutReply, LogoutRequest,
        PacketAck, StartPingCheck, UseCircuitCode,
    },
    serde_json::Value,
    InboundClass, MessageContainer, MessageDecl, MessageError, MessageKind, MessageKinds, Packet,
    PingManager, Protocol, QueuedMessage, RetransmitPolicy, Uuid, Variable2,
};

use crate::{
    circuit::{
        validate_handshake, Circuit, CircuitRef, CircuitState, CircuitTable, CloseReason,
        HandshakeAction, HandshakeError,
    },
    dispatch::{
        check_trust, DispatchError, DispatchOutcome, Dispatcher, HandlerContext, HandlerTrust,
        MessageHandler, Origin, TrustViolation,
    },
    event_queue::{Delivery, EventQueueSink},
    events::ServerEvent,
    stats::{StatsSnapshot, TransportStats},
    transport::{PacketReceiver, PacketSender},
    GridlinkServerError, SendError, ServerConfig,
};

/// Where an outbound message went
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendReceipt {
    Udp(QueuedMessage),
    EventQueue,
}

/// What to do with an inbound packet once its circuit is unlocked
enum Inbound {
    Dispatch(HandlerContext, MessageContainer),
    Close(CloseReason),
    Done,
}

/// The simulator side of the viewer protocol: owns every circuit, reads
/// datagrams, runs the reliability timers and dispatches decoded messages
/// to registered handlers.
///
/// Every method takes `&self`, so the receive path and the tick path may
/// run on different threads.
pub struct Server {
    config: ServerConfig,
    message_kinds: MessageKinds,
    tick_interval: Duration,
    circuits: CircuitTable,
    dispatcher: Dispatcher,
    sender: RwLock<Option<Box<dyn PacketSender>>>,
    receiver: Mutex<Option<Box<dyn PacketReceiver>>>,
    event_queue: RwLock<Option<Arc<dyn EventQueueSink>>>,
    events: Mutex<VecDeque<ServerEvent>>,
    stats: TransportStats,
}

impl Server {
    /// Create a new Server
    pub fn new<P: Into<Protocol>>(server_config: ServerConfig, protocol: P) -> Self {
        let protocol: Protocol = protocol.into();
        let Protocol {
            message_kinds,
            tick_interval,
            ..
        } = protocol;

        Self {
            config: server_config,
            message_kinds,
            tick_interval,
            circuits: CircuitTable::new(),
            dispatcher: Dispatcher::new(),
            sender: RwLock::new(None),
            receiver: Mutex::new(None),
            event_queue: RwLock::new(None),
            events: Mutex::new(VecDeque::new()),
            stats: TransportStats::new(),
        }
    }

    /// Attach the datagram transport
    pub fn listen(&self, sender: Box<dyn PacketSender>, receiver: Box<dyn PacketReceiver>) {
        *self.sender.write() = Some(sender);
        *self.receiver.lock() = Some(receiver);
    }

    /// Attach only the sending half, for runners that push received
    /// datagrams through `receive_packet` themselves
    pub fn connect_sender(&self, sender: Box<dyn PacketSender>) {
        *self.sender.write() = Some(sender);
    }

    pub fn set_event_queue(&self, sink: Arc<dyn EventQueueSink>) {
        *self.event_queue.write() = Some(sink);
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn message_kinds(&self) -> &MessageKinds {
        &self.message_kinds
    }

    /// Interval `tick` is expected to be called at
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Events raised since the last call
    pub fn take_events(&self) -> Vec<ServerEvent> {
        self.events.lock().drain(..).collect()
    }

    // Handlers

    /// Appends a handler for messages of type `M`
    pub fn register_handler<M: MessageDecl, H: MessageHandler + 'static>(
        &self,
        trust: HandlerTrust,
        handler: H,
    ) -> Result<(), DispatchError> {
        self.dispatcher.register(
            &self.message_kinds,
            MessageKind::of::<M>(),
            trust,
            Arc::new(handler),
        )
    }

    // Circuit lifecycle

    /// A random circuit code not currently issued
    pub fn generate_circuit_code(&self) -> u32 {
        loop {
            let code = fastrand::u32(1..);
            if self.circuits.get_by_code(code).is_none() {
                return code;
            }
        }
    }

    /// Issues a circuit that waits for the viewer's `UseCircuitCode`
    pub fn create_circuit(
        &self,
        agent_id: Uuid,
        session_id: Uuid,
        secure_session_id: Uuid,
        circuit_code: u32,
        now: Instant,
    ) -> Result<CircuitRef, GridlinkServerError> {
        let circuit = Circuit::new(
            agent_id,
            session_id,
            secure_session_id,
            circuit_code,
            &self.config.circuit,
            &self.config.throttle,
            &self.config.ping,
            now,
        );
        let circuit_ref = self.circuits.insert(circuit)?;
        debug!("issued circuit code {:#x} to agent {}", circuit_code, agent_id);
        Ok(circuit_ref)
    }

    /// `None` once the circuit is closed
    pub fn lookup_circuit(&self, agent_id: &Uuid) -> Option<CircuitRef> {
        self.circuits.get(agent_id)
    }

    pub fn circuit_count(&self) -> usize {
        self.circuits.len()
    }

    pub fn close_circuit(&self, agent_id: &Uuid, reason: CloseReason, now: Instant) -> bool {
        self.close_with(agent_id, reason, now)
    }

    /// Administrative logout: moves the circuit to `Draining` and sends
    /// `LogoutReply`
    pub fn begin_logout(&self, agent_id: &Uuid, now: Instant) -> bool {
        let Some(circuit_ref) = self.circuits.get(agent_id) else {
            return false;
        };
        let mut circuit = circuit_ref.lock();
        self.start_logout(&mut circuit, now)
    }

    /// Sends `KickUser` unreliably, then closes the circuit
    pub fn kick(&self, agent_id: &Uuid, reason: &str, now: Instant) -> bool {
        let Some(circuit_ref) = self.circuits.get(agent_id) else {
            return false;
        };
        {
            let mut circuit = circuit_ref.lock();
            if let Some(endpoint) = circuit.remote_endpoint() {
                let target_ip = match endpoint.ip() {
                    IpAddr::V4(ip) => ip.octets(),
                    IpAddr::V6(_) => [0; 4],
                };
                let kick = KickUser {
                    target_ip,
                    target_port: endpoint.port(),
                    agent_id: circuit.agent_id(),
                    session_id: circuit.session_id(),
                    reason: Variable2::from_str_truncated(reason),
                };
                self.queue_internal(&mut circuit, MessageContainer::new(kick), now);
                self.flush(&mut circuit, now);
            }
        }
        info!("kicking agent {}: {}", agent_id, reason);
        self.close_with(agent_id, CloseReason::Kicked, now)
    }

    // Outgoing

    /// Sends `message` to the agent over UDP or the event queue, as
    /// `delivery` and the message metadata decide
    pub fn send_message(
        &self,
        agent_id: &Uuid,
        message: MessageContainer,
        delivery: Delivery,
        now: Instant,
    ) -> Result<SendReceipt, SendError> {
        let circuit_ref = self
            .circuits
            .get(agent_id)
            .ok_or(SendError::CircuitNotFound {
                agent_id: *agent_id,
            })?;
        let meta = message.meta();
        let name = message.name();
        let event_only = message.number().is_none();

        let use_event_queue = match delivery {
            Delivery::Udp => {
                if event_only {
                    return Err(MessageError::NotUdpDeliverable { name }.into());
                }
                false
            }
            Delivery::EventQueue => {
                if !meta.alt_transport {
                    return Err(MessageError::NotAltTransport { name }.into());
                }
                true
            }
            Delivery::Auto => {
                event_only
                    || (meta.alt_transport
                        && self.config.prefer_event_queue
                        && self.event_queue.read().is_some())
            }
        };
        if use_event_queue {
            return self.send_to_event_queue(agent_id, &message);
        }

        let mut circuit = circuit_ref.lock();
        match circuit.state() {
            CircuitState::Closed => {
                return Err(SendError::CircuitNotFound {
                    agent_id: *agent_id,
                })
            }
            CircuitState::Handshaking => {
                return Err(SendError::CircuitNotEstablished {
                    agent_id: *agent_id,
                    name,
                })
            }
            CircuitState::Draining if meta.reliable && meta.throttle.is_some() => {
                return Err(SendError::CircuitDraining {
                    agent_id: *agent_id,
                    name,
                })
            }
            CircuitState::Established | CircuitState::Draining => {}
        }

        let queued = circuit.base.queue_message(&self.message_kinds, &message, now)?;
        if queued.throttled {
            self.stats.add_throttled_sends(1);
        }
        self.flush(&mut circuit, now);
        Ok(SendReceipt::Udp(queued))
    }

    fn send_to_event_queue(
        &self,
        agent_id: &Uuid,
        message: &MessageContainer,
    ) -> Result<SendReceipt, SendError> {
        let sink = self
            .event_queue
            .read()
            .clone()
            .ok_or(SendError::NoEventQueue {
                name: message.name(),
            })?;
        let event = self.message_kinds.to_structured(message)?;
        sink.enqueue(agent_id, event)?;
        trace!("{} to agent {} over the event queue", message.name(), agent_id);
        Ok(SendReceipt::EventQueue)
    }

    // Incoming

    /// Reads every datagram waiting on the attached receiver, then returns
    /// the events raised meanwhile
    pub fn receive(&self, now: Instant) -> Vec<ServerEvent> {
        loop {
            let (address, payload) = {
                let mut receiver = self.receiver.lock();
                let Some(receiver) = receiver.as_mut() else {
                    break;
                };
                match receiver.receive() {
                    Ok(Some((address, payload))) => (address, payload.to_vec()),
                    Ok(None) => break,
                    Err(_) => {
                        warn!("Server Error: cannot read from packet receiver");
                        break;
                    }
                }
            };
            self.receive_packet(address, &payload, now);
        }
        self.take_events()
    }

    /// Processes one datagram received from `address`
    pub fn receive_packet(&self, address: SocketAddr, payload: &[u8], now: Instant) {
        self.stats.add_packets_in(1);
        self.stats.add_bytes_in(payload.len() as u64);

        let packet = match Packet::parse(payload) {
            Ok(packet) => packet,
            Err(error) => {
                self.stats.add_envelope_errors(1);
                debug!("dropping malformed datagram from {}: {}", address, error);
                return;
            }
        };

        match self.circuits.get_by_endpoint(&address) {
            Some(circuit_ref) => self.receive_on_circuit(&circuit_ref, packet, now),
            None => self.receive_handshake(address, packet, now),
        }
    }

    /// Dispatches a structured event-queue message, `{"message": name,
    /// "body": {...}}`, as internal traffic of the agent's circuit
    pub fn receive_event(
        &self,
        agent_id: &Uuid,
        event: &Value,
    ) -> Result<DispatchOutcome, GridlinkServerError> {
        let name = event
            .get("message")
            .and_then(Value::as_str)
            .ok_or(GridlinkServerError::MalformedEvent {
                reason: "missing message name",
            })?;
        let body = event
            .get("body")
            .ok_or(GridlinkServerError::MalformedEvent {
                reason: "missing body",
            })?;
        let message = self.message_kinds.read_structured(name, body)?;
        self.inject_internal(agent_id, message)
    }

    /// Dispatches a message produced inside the simulator on behalf of the
    /// agent's circuit
    pub fn inject_internal(
        &self,
        agent_id: &Uuid,
        message: MessageContainer,
    ) -> Result<DispatchOutcome, GridlinkServerError> {
        let circuit_ref = self
            .circuits
            .get(agent_id)
            .ok_or(GridlinkServerError::CircuitNotFound {
                agent_id: *agent_id,
            })?;
        let context = {
            let circuit = circuit_ref.lock();
            if let Err(violation) = check_trust(
                message.name(),
                &message.meta(),
                Origin::Internal,
                circuit.state(),
                &circuit.identity(),
                message.identity(),
            ) {
                self.stats.add_trust_violations(1);
                warn!("agent {}: {}", agent_id, violation);
                self.push_event(ServerEvent::TrustViolation {
                    agent_id: *agent_id,
                    violation: violation.clone(),
                });
                return Err(violation.into());
            }
            Self::handler_context(&circuit, Origin::Internal)
        };
        Ok(self.dispatch(&context, &message))
    }

    fn receive_handshake(&self, address: SocketAddr, packet: Packet, now: Instant) {
        let message = match self.message_kinds.read_body(&packet.body) {
            Ok(message) => message,
            Err(error) => {
                self.count_decode_error(&address, &error);
                return;
            }
        };
        let Some(use_code) = message.downcast_ref::<UseCircuitCode>() else {
            self.reject_handshake(
                address,
                HandshakeError::UnexpectedMessage {
                    endpoint: address,
                    name: message.name(),
                },
            );
            return;
        };
        let Some(circuit_ref) = self.circuits.get_by_code(use_code.code) else {
            self.reject_handshake(address, HandshakeError::UnknownCode { code: use_code.code });
            return;
        };

        let (action, context) = {
            let mut circuit = circuit_ref.lock();
            let action = match validate_handshake(&circuit, use_code, address) {
                Ok(action) => action,
                Err(error) => {
                    drop(circuit);
                    self.reject_handshake(address, error);
                    return;
                }
            };
            if action == HandshakeAction::Establish {
                circuit.establish(address, now);
            }
            circuit.base.process_incoming(&packet, now);
            self.flush(&mut circuit, now);
            (action, Self::handler_context(&circuit, Origin::Network))
        };

        if action == HandshakeAction::Establish {
            self.circuits.bind_endpoint(&circuit_ref.agent_id(), address);
            self.push_event(ServerEvent::CircuitEstablished {
                agent_id: circuit_ref.agent_id(),
                endpoint: address,
            });
            self.dispatch(&context, &message);
        }
    }

    fn reject_handshake(&self, address: SocketAddr, error: HandshakeError) {
        self.stats.add_handshake_failures(1);
        warn!("rejecting handshake from {}: {}", address, error);
        self.push_event(ServerEvent::HandshakeRejected {
            endpoint: address,
            error,
        });
    }

    fn receive_on_circuit(&self, circuit_ref: &CircuitRef, packet: Packet, now: Instant) {
        let inbound = {
            let mut circuit = circuit_ref.lock();
            if circuit.is_closed() {
                return;
            }
            self.process_on_circuit(&mut circuit, packet, now)
        };

        match inbound {
            Inbound::Dispatch(context, message) => {
                self.dispatch(&context, &message);
            }
            Inbound::Close(reason) => {
                self.close_with(&circuit_ref.agent_id(), reason, now);
            }
            Inbound::Done => {}
        }
    }

    fn process_on_circuit(&self, circuit: &mut Circuit, packet: Packet, now: Instant) -> Inbound {
        match circuit.base.process_incoming(&packet, now) {
            InboundClass::New => {}
            InboundClass::Duplicate => {
                self.stats.add_duplicates(1);
                trace!(
                    "duplicate packet {} from agent {}",
                    packet.sequence,
                    circuit.agent_id()
                );
                return Inbound::Done;
            }
            InboundClass::Stale => {
                self.stats.add_stale_drops(1);
                trace!(
                    "stale packet {} from agent {}",
                    packet.sequence,
                    circuit.agent_id()
                );
                return Inbound::Done;
            }
        }

        let message = match self.message_kinds.read_body(&packet.body) {
            Ok(message) => message,
            Err(error) => {
                if let Some(endpoint) = circuit.remote_endpoint() {
                    self.count_decode_error(&endpoint, &error);
                }
                return Inbound::Done;
            }
        };

        // circuit control traffic never reaches handlers
        if let Some(ack) = message.downcast_ref::<PacketAck>() {
            circuit.base.process_packet_ack(ack);
            return Inbound::Done;
        }
        if let Some(ping) = message.downcast_ref::<StartPingCheck>() {
            let reply = PingManager::reply_to(ping);
            self.queue_internal(circuit, MessageContainer::new(reply), now);
            self.flush(circuit, now);
            return Inbound::Done;
        }
        if let Some(pong) = message.downcast_ref::<CompletePingCheck>() {
            circuit.base.process_pong(pong, now);
            return Inbound::Done;
        }
        if message.is::<CloseCircuit>() {
            return Inbound::Close(CloseReason::ClosedByViewer);
        }
        if message.is::<UseCircuitCode>() {
            return Inbound::Done;
        }

        let meta = message.meta();
        if let Err(violation) = check_trust(
            message.name(),
            &meta,
            Origin::Network,
            circuit.state(),
            &circuit.identity(),
            message.identity(),
        ) {
            return self.trust_violation(circuit, violation);
        }

        if circuit.state() == CircuitState::Draining && meta.reliable && meta.throttle.is_some() {
            self.stats.add_drain_drops(1);
            debug!(
                "agent {} is logging out, dropping {}",
                circuit.agent_id(),
                message.name()
            );
            return Inbound::Done;
        }

        if message.is::<LogoutRequest>() {
            self.start_logout(circuit, now);
        }
        if let Some(throttle) = message.downcast_ref::<AgentThrottle>() {
            self.apply_throttle(circuit, throttle);
        }

        Inbound::Dispatch(Self::handler_context(circuit, Origin::Network), message)
    }

    fn trust_violation(&self, circuit: &mut Circuit, violation: TrustViolation) -> Inbound {
        self.stats.add_trust_violations(1);
        let count = circuit.record_trust_violation();
        warn!(
            "agent {}: {} ({} so far)",
            circuit.agent_id(),
            violation,
            count
        );
        self.push_event(ServerEvent::TrustViolation {
            agent_id: circuit.agent_id(),
            violation,
        });
        if count >= circuit.base.config().max_trust_violations {
            Inbound::Close(CloseReason::TrustViolations)
        } else {
            Inbound::Done
        }
    }

    fn apply_throttle(&self, circuit: &mut Circuit, throttle: &AgentThrottle) {
        let Some(rates) = throttle.bytes_per_second() else {
            warn!(
                "agent {} sent a malformed throttle block",
                circuit.agent_id()
            );
            return;
        };
        match circuit.base.stage_throttle(&rates) {
            Ok(()) => debug!("agent {} throttle staged: {:?}", circuit.agent_id(), rates),
            Err(error) => warn!("agent {}: {}", circuit.agent_id(), error),
        }
    }

    fn start_logout(&self, circuit: &mut Circuit, now: Instant) -> bool {
        if !circuit.begin_draining(now) {
            return false;
        }
        let reply = LogoutReply::new(circuit.agent_id(), circuit.session_id());
        self.queue_internal(circuit, MessageContainer::new(reply), now);
        self.flush(circuit, now);
        self.push_event(ServerEvent::LogoutStarted {
            agent_id: circuit.agent_id(),
        });
        true
    }

    fn count_decode_error(&self, address: &SocketAddr, error: &MessageError) {
        match error {
            MessageError::UnknownMessageType { .. } => self.stats.add_unknown_message_types(1),
            _ => self.stats.add_decode_errors(1),
        }
        debug!("dropping packet from {}: {}", address, error);
    }

    fn dispatch(&self, context: &HandlerContext, message: &MessageContainer) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch(context, message);
        if !outcome.failures.is_empty() {
            self.stats
                .add_handler_failures(outcome.failures.len() as u64);
        }
        outcome
    }

    fn handler_context(circuit: &Circuit, origin: Origin) -> HandlerContext {
        HandlerContext {
            agent_id: circuit.agent_id(),
            session_id: circuit.session_id(),
            origin,
            endpoint: circuit.remote_endpoint(),
        }
    }

    // Timers

    /// Must be called regularly: times out circuits, resends unacked
    /// packets, pings, and flushes throttled packets and owed acks
    pub fn tick(&self, now: Instant) {
        for circuit_ref in self.circuits.circuits() {
            let close = {
                let mut circuit = circuit_ref.lock();
                if circuit.is_closed() {
                    continue;
                }
                self.tick_circuit(&mut circuit, now)
            };
            if let Some(reason) = close {
                self.close_with(&circuit_ref.agent_id(), reason, now);
            }
        }
    }

    fn tick_circuit(&self, circuit: &mut Circuit, now: Instant) -> Option<CloseReason> {
        if let Some(reason) = circuit.expiry(now) {
            return Some(reason);
        }
        if !circuit.state().is_connected() {
            return None;
        }

        let report = circuit.base.collect_resends(now);
        self.stats.add_resends(report.queued as u64);

        let mut close = None;
        for exhausted in report.exhausted {
            self.stats.add_retransmit_exhaustions(1);
            warn!(
                "abandoning {} (sequence {}) to agent {} after {} resends",
                exhausted.name,
                exhausted.sequence,
                circuit.agent_id(),
                exhausted.retry_count
            );
            circuit.mark_degraded();
            self.push_event(ServerEvent::RetransmitExhausted {
                agent_id: circuit.agent_id(),
                sequence: exhausted.sequence,
                name: exhausted.name,
                retry_count: exhausted.retry_count,
            });
            if circuit.base.config().retransmit_policy == RetransmitPolicy::CloseCircuit {
                close = Some(CloseReason::RetransmitExhausted);
            }
        }

        if circuit.state() == CircuitState::Established && circuit.base.should_send_ping(now) {
            let ping = circuit.base.start_ping(now);
            self.queue_internal(circuit, MessageContainer::new(ping), now);
        }

        self.flush(circuit, now);
        close
    }

    // Private methods

    fn close_with(&self, agent_id: &Uuid, reason: CloseReason, now: Instant) -> bool {
        if reason.notifies_viewer() {
            if let Some(circuit_ref) = self.circuits.get(agent_id) {
                let mut circuit = circuit_ref.lock();
                if !circuit.is_closed() && circuit.remote_endpoint().is_some() {
                    self.queue_internal(&mut circuit, MessageContainer::new(CloseCircuit), now);
                    self.flush(&mut circuit, now);
                }
            }
        }
        if self.circuits.close(agent_id, reason, now).is_none() {
            return false;
        }
        self.push_event(ServerEvent::CircuitClosed {
            agent_id: *agent_id,
            reason,
        });
        true
    }

    /// Queues a message the server itself originates, whatever the
    /// circuit's state
    fn queue_internal(&self, circuit: &mut Circuit, message: MessageContainer, now: Instant) {
        match circuit.base.queue_message(&self.message_kinds, &message, now) {
            Ok(queued) => {
                if queued.throttled {
                    self.stats.add_throttled_sends(1);
                }
            }
            Err(error) => warn!(
                "Server Error: cannot queue {} to agent {}: {}",
                message.name(),
                circuit.agent_id(),
                error
            ),
        }
    }

    /// Puts everything the circuit may send right now on the wire
    fn flush(&self, circuit: &mut Circuit, now: Instant) {
        let Some(endpoint) = circuit.remote_endpoint() else {
            return;
        };
        let datagrams = circuit.base.drain_outgoing(&self.message_kinds, now);
        if datagrams.is_empty() {
            return;
        }

        let sender = self.sender.read();
        let Some(sender) = sender.as_ref() else {
            self.stats.add_send_errors(datagrams.len() as u64);
            warn!("Server Error: no transport to send to {}", endpoint);
            return;
        };
        for datagram in datagrams {
            if sender.send(&endpoint, &datagram).is_err() {
                self.stats.add_send_errors(1);
                warn!("Server Error: Cannot send packet to {}", endpoint);
                continue;
            }
            self.stats.add_packets_out(1);
            self.stats.add_bytes_out(datagram.len() as u64);
        }
    }

    fn push_event(&self, event: ServerEvent) {
        let limit = self.config.max_buffered_events;
        let mut events = self.events.lock();
        if limit == 0 {
            self.stats.add_dropped_events(1);
            return;
        }
        while events.len() >= limit {
            events.pop_front();
            self.stats.add_dropped_events(1);
        }
        events.push_back(event);
    }
}
