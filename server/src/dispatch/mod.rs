mod dispatcher;
mod error;
mod handler;
mod trust_gate;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::DispatchError;
pub use handler::{HandlerContext, HandlerError, HandlerTrust, MessageHandler};
pub use trust_gate::{check_trust, Origin, TrustViolation};
