use std::{fmt, net::SocketAddr, time::Instant};

use log::info;

use gridlink_shared::{
    AgentIdentity, BaseConnection, CircuitConfig, PingConfig, ThrottleConfig, Uuid,
};

/// Lifecycle of a circuit. `Closed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CircuitState {
    /// Issued, waiting for `UseCircuitCode`
    Handshaking,
    Established,
    /// Logging out: acks and resends still flow, new reliable application
    /// traffic does not
    Draining,
    Closed,
}

impl CircuitState {
    /// Whether the circuit carries traffic from a bound endpoint
    pub fn is_connected(&self) -> bool {
        matches!(self, CircuitState::Established | CircuitState::Draining)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// Logout completed with every pending ack answered
    Logout,
    /// Logout gave up waiting for pending acks
    DrainTimeout,
    /// Viewer never presented the circuit code
    HandshakeTimeout,
    /// Nothing received for the inactivity window
    Inactivity,
    /// Viewer sent `CloseCircuit`
    ClosedByViewer,
    Kicked,
    TrustViolations,
    /// A reliable packet ran out of resends under the close policy
    RetransmitExhausted,
    /// Closed by a collaborator through the circuit lifecycle interface
    Requested,
}

impl CloseReason {
    /// Whether the viewer is told with a `CloseCircuit` before the circuit
    /// goes away
    pub fn notifies_viewer(&self) -> bool {
        !matches!(
            self,
            CloseReason::ClosedByViewer | CloseReason::HandshakeTimeout | CloseReason::Inactivity
        )
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CloseReason::Logout => "logout",
            CloseReason::DrainTimeout => "drain timeout",
            CloseReason::HandshakeTimeout => "handshake timeout",
            CloseReason::Inactivity => "inactivity",
            CloseReason::ClosedByViewer => "closed by viewer",
            CloseReason::Kicked => "kicked",
            CloseReason::TrustViolations => "repeated trust violations",
            CloseReason::RetransmitExhausted => "retransmit exhausted",
            CloseReason::Requested => "requested",
        };
        f.write_str(text)
    }
}

/// One agent session with this simulator: identity, lifecycle and the
/// wire state of its connection
pub struct Circuit {
    agent_id: Uuid,
    session_id: Uuid,
    secure_session_id: Uuid,
    circuit_code: u32,
    remote_endpoint: Option<SocketAddr>,
    state: CircuitState,
    state_since: Instant,
    trust_violations: u32,
    degraded: bool,
    close_reason: Option<CloseReason>,
    pub base: BaseConnection,
}

impl Circuit {
    pub fn new(
        agent_id: Uuid,
        session_id: Uuid,
        secure_session_id: Uuid,
        circuit_code: u32,
        circuit_config: &CircuitConfig,
        throttle_config: &ThrottleConfig,
        ping_config: &PingConfig,
        now: Instant,
    ) -> Self {
        Self {
            agent_id,
            session_id,
            secure_session_id,
            circuit_code,
            remote_endpoint: None,
            state: CircuitState::Handshaking,
            state_since: now,
            trust_violations: 0,
            degraded: false,
            close_reason: None,
            base: BaseConnection::new(circuit_config, throttle_config, ping_config, now),
        }
    }

    pub fn agent_id(&self) -> Uuid {
        self.agent_id
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn secure_session_id(&self) -> Uuid {
        self.secure_session_id
    }

    pub fn circuit_code(&self) -> u32 {
        self.circuit_code
    }

    pub fn identity(&self) -> AgentIdentity {
        AgentIdentity::new(self.agent_id, self.session_id)
    }

    pub fn remote_endpoint(&self) -> Option<SocketAddr> {
        self.remote_endpoint
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == CircuitState::Closed
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason
    }

    pub fn trust_violations(&self) -> u32 {
        self.trust_violations
    }

    /// Set once a reliable packet was abandoned and the circuit kept open
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn mark_degraded(&mut self) {
        self.degraded = true;
    }

    // Transitions

    /// `Handshaking -> Established`, binding the viewer's endpoint
    pub fn establish(&mut self, endpoint: SocketAddr, now: Instant) -> bool {
        if self.state != CircuitState::Handshaking {
            return false;
        }
        self.remote_endpoint = Some(endpoint);
        self.set_state(CircuitState::Established, now);
        info!(
            "circuit {:#x} established for agent {} at {}",
            self.circuit_code, self.agent_id, endpoint
        );
        true
    }

    /// `Established -> Draining`
    pub fn begin_draining(&mut self, now: Instant) -> bool {
        if self.state != CircuitState::Established {
            return false;
        }
        self.set_state(CircuitState::Draining, now);
        info!("circuit for agent {} is logging out", self.agent_id);
        true
    }

    /// Any state to `Closed`. Pending resends, owed acks and throttled
    /// packets are discarded together with the transition.
    pub fn close(&mut self, reason: CloseReason, now: Instant) -> bool {
        if self.state == CircuitState::Closed {
            return false;
        }
        self.base.clear();
        self.close_reason = Some(reason);
        self.set_state(CircuitState::Closed, now);
        info!("circuit for agent {} closed: {}", self.agent_id, reason);
        true
    }

    /// Counts a trust violation and returns the running total
    pub fn record_trust_violation(&mut self) -> u32 {
        self.trust_violations = self.trust_violations.saturating_add(1);
        self.trust_violations
    }

    /// The reason this circuit should close at `now`, if any
    pub fn expiry(&self, now: Instant) -> Option<CloseReason> {
        let config = self.base.config();
        match self.state {
            CircuitState::Handshaking => (now.saturating_duration_since(self.state_since)
                >= config.handshake_timeout)
                .then_some(CloseReason::HandshakeTimeout),
            CircuitState::Established => (now
                .saturating_duration_since(self.base.last_received())
                >= config.inactivity_timeout)
                .then_some(CloseReason::Inactivity),
            CircuitState::Draining => {
                if !self.base.has_pending_acks() {
                    Some(CloseReason::Logout)
                } else if now.saturating_duration_since(self.state_since) >= config.drain_timeout
                {
                    Some(CloseReason::DrainTimeout)
                } else if now.saturating_duration_since(self.base.last_received())
                    >= config.inactivity_timeout
                {
                    Some(CloseReason::Inactivity)
                } else {
                    None
                }
            }
            CircuitState::Closed => None,
        }
    }

    fn set_state(&mut self, state: CircuitState, now: Instant) {
        self.state = state;
        self.state_since = now;
    }
}
