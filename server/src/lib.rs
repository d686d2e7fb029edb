//! # Gridlink Server
//! The simulator side of the viewer circuit protocol: issues circuits,
//! completes the `UseCircuitCode` handshake, keeps reliable traffic
//! flowing under the per-category throttle and dispatches decoded
//! messages to registered handlers behind the trust gate.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub mod transport;
pub mod shared {
    pub use gridlink_shared::{
        builtin, serde_json, AgentIdentity, CircuitConfig, MessageContainer, MessageDecl,
        MessageKind, PingConfig, Protocol, RetransmitPolicy, ThrottleCategory, ThrottleConfig,
        Trust, Uuid,
    };
}

mod circuit;
mod dispatch;
mod error;
mod event_queue;
mod events;
mod server;
mod stats;

cfg_if! {
    if #[cfg(feature = "metrics")] {
        mod metrics;
        pub use metrics::PrometheusStats;
    } else {}
}

pub use circuit::{
    validate_handshake, Circuit, CircuitRef, CircuitState, CircuitTable, CloseReason,
    HandshakeAction, HandshakeError,
};
pub use dispatch::{
    check_trust, DispatchError, DispatchOutcome, Dispatcher, HandlerContext, HandlerError,
    HandlerTrust, MessageHandler, Origin, TrustViolation,
};
pub use error::{GridlinkServerError, SendError};
pub use event_queue::{Delivery, EventQueueError, EventQueueSink};
pub use events::ServerEvent;
pub use server::{SendReceipt, Server, ServerConfig};
pub use stats::{StatsSnapshot, TransportStats};
