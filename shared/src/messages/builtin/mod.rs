//! The circuit's own messages and a representative slice of the viewer
//! catalog.

mod agent;
mod bulk;
mod circuit;
mod region;
mod session;

pub use agent::{
    AgentMovementComplete, AgentUpdate, ChatFromViewer, CompleteAgentMovement,
    ImprovedInstantMessage,
};
pub use bulk::{ImageData, LayerData, TransferPacket};
pub use circuit::{CloseCircuit, CompletePingCheck, PacketAck, StartPingCheck, UseCircuitCode};
pub use region::{EnableSimulator, EstablishAgentCommunication, RegionHandshake, TeleportFinish};
pub use session::{AgentThrottle, KickUser, LogoutReply, LogoutRequest};
