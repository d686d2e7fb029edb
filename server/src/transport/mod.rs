cfg_if! {
    if #[cfg(feature = "transport_udp")] {
        pub mod udp;
    } else {}
}

pub mod channel;

pub use inner::{PacketReceiver, PacketSender, RecvError, SendError};

mod inner {
    use std::net::SocketAddr;

    #[derive(Debug)]
    pub struct SendError;

    #[derive(Debug)]
    pub struct RecvError;

    pub trait PacketSender: Send + Sync {
        /// Sends a datagram to `address`
        fn send(&self, address: &SocketAddr, payload: &[u8]) -> Result<(), SendError>;
    }

    pub trait PacketReceiver: Send + Sync {
        /// Receives the next pending datagram, if any
        fn receive(&mut self) -> Result<Option<(SocketAddr, &[u8])>, RecvError>;
    }
}
