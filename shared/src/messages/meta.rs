use crate::connection::throttle::ThrottleCategory;

/// Which delivery channel a message may arrive on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trust {
    /// Simulator-internal origin only, never the raw socket
    Trusted,
    /// Raw socket of an authenticated circuit, identity must match
    NotTrusted,
    /// No restriction
    Unset,
}

/// Static per-type metadata consulted by the envelope, the throttle and the
/// trust gate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageMeta {
    pub reliable: bool,
    pub trust: Trust,
    pub zerocoded: bool,
    /// May be delivered through the event queue instead of UDP
    pub alt_transport: bool,
    /// `None` for control traffic, which bypasses the throttle
    pub throttle: Option<ThrottleCategory>,
}

impl MessageMeta {
    pub const fn new() -> Self {
        Self {
            reliable: false,
            trust: Trust::Unset,
            zerocoded: false,
            alt_transport: false,
            throttle: Some(ThrottleCategory::Task),
        }
    }

    pub const fn reliable(mut self) -> Self {
        self.reliable = true;
        self
    }

    pub const fn trusted(mut self) -> Self {
        self.trust = Trust::Trusted;
        self
    }

    pub const fn not_trusted(mut self) -> Self {
        self.trust = Trust::NotTrusted;
        self
    }

    pub const fn zerocoded(mut self) -> Self {
        self.zerocoded = true;
        self
    }

    pub const fn alt_transport(mut self) -> Self {
        self.alt_transport = true;
        self
    }

    pub const fn throttle(mut self, category: ThrottleCategory) -> Self {
        self.throttle = Some(category);
        self
    }

    /// Circuit housekeeping: never throttled
    pub const fn control(mut self) -> Self {
        self.throttle = None;
        self
    }
}

impl Default for MessageMeta {
    fn default() -> Self {
        Self::new()
    }
}
