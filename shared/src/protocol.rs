use std::time::Duration;

use crate::messages::{
    builtin::{
        AgentMovementComplete, AgentThrottle, AgentUpdate, ChatFromViewer, CloseCircuit,
        CompleteAgentMovement, CompletePingCheck, EnableSimulator, EstablishAgentCommunication,
        ImageData, ImprovedInstantMessage, KickUser, LayerData, LogoutReply, LogoutRequest,
        PacketAck, RegionHandshake, StartPingCheck, TeleportFinish, TransferPacket,
        UseCircuitCode,
    },
    message::MessageDecl,
    message_kinds::MessageKinds,
};

pub mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

/// Messages the circuit layer itself depends on
pub struct TransportPlugin;

impl ProtocolPlugin for TransportPlugin {
    fn build(&self, protocol: &mut Protocol) {
        protocol
            .add_message::<UseCircuitCode>()
            .add_message::<PacketAck>()
            .add_message::<StartPingCheck>()
            .add_message::<CompletePingCheck>()
            .add_message::<CloseCircuit>()
            .add_message::<LogoutRequest>()
            .add_message::<LogoutReply>()
            .add_message::<KickUser>()
            .add_message::<AgentThrottle>();
    }
}

/// Region entry, chat and bulk transfer messages
pub struct ViewerCatalogPlugin;

impl ProtocolPlugin for ViewerCatalogPlugin {
    fn build(&self, protocol: &mut Protocol) {
        protocol
            .add_message::<AgentUpdate>()
            .add_message::<ChatFromViewer>()
            .add_message::<ImprovedInstantMessage>()
            .add_message::<CompleteAgentMovement>()
            .add_message::<AgentMovementComplete>()
            .add_message::<RegionHandshake>()
            .add_message::<EnableSimulator>()
            .add_message::<TeleportFinish>()
            .add_message::<EstablishAgentCommunication>()
            .add_message::<LayerData>()
            .add_message::<ImageData>()
            .add_message::<TransferPacket>();
    }
}

// Protocol
pub struct Protocol {
    pub message_kinds: MessageKinds,
    /// The duration between each tick of the server loop
    pub tick_interval: Duration,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        let mut protocol = Self {
            message_kinds: MessageKinds::new(),
            tick_interval: Duration::from_millis(50),
            locked: false,
        };
        TransportPlugin.build(&mut protocol);
        protocol
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn add_viewer_catalog(&mut self) -> &mut Self {
        self.add_plugin(ViewerCatalogPlugin)
    }

    pub fn tick_interval(&mut self, duration: Duration) -> &mut Self {
        self.check_lock();
        self.tick_interval = duration;
        self
    }

    pub fn add_message<M: MessageDecl>(&mut self) -> &mut Self {
        self.check_lock();
        self.message_kinds.add_message::<M>();
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_tick_interval(&mut self, duration: Duration) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.tick_interval = duration;
        Ok(self)
    }

    pub fn try_add_message<M: MessageDecl>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.message_kinds.try_add_message::<M>()?;
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
