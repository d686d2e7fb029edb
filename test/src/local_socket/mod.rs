/// In-memory socket pair for E2E testing
/// Routes datagrams between the server and one viewer without network I/O
use std::net::SocketAddr;

use gridlink_server::transport::{
    channel::{PacketChannel, PacketChannelReceiver, PacketChannelSender},
    PacketReceiver, PacketSender,
};

pub const FAKE_VIEWER_ADDR: &str = "127.0.0.1:13000";

/// Connected server and viewer halves. The server side sees the viewer's
/// address on every datagram; the viewer side sees its own.
pub struct LocalSocketPair {
    pub server_sender: Box<dyn PacketSender>,
    pub server_receiver: Box<dyn PacketReceiver>,
    pub viewer_sender: PacketChannelSender,
    pub viewer_receiver: PacketChannelReceiver,
    pub viewer_addr: SocketAddr,
}

impl LocalSocketPair {
    pub fn new() -> Self {
        let (server_sender, viewer_receiver) = PacketChannel::unbounded();
        let (viewer_sender, server_receiver) = PacketChannel::unbounded();
        Self {
            server_sender: Box::new(server_sender),
            server_receiver: Box::new(server_receiver),
            viewer_sender,
            viewer_receiver,
            viewer_addr: FAKE_VIEWER_ADDR.parse().unwrap(),
        }
    }
}

impl Default for LocalSocketPair {
    fn default() -> Self {
        Self::new()
    }
}
