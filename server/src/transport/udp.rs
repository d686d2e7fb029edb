use std::{io, net::SocketAddr, sync::Arc, time::Instant};

use log::{info, warn};
use tokio::net::UdpSocket;

use gridlink_shared::MTU_SIZE_BYTES;

use super::{PacketSender, SendError};
use crate::{Server, ServerEvent};

// Larger than the MTU so oversized datagrams are seen, and rejected, whole
const RECV_BUFFER_SIZE: usize = MTU_SIZE_BYTES * 4;

struct UdpPacketSender {
    socket: Arc<UdpSocket>,
}

impl PacketSender for UdpPacketSender {
    fn send(&self, address: &SocketAddr, payload: &[u8]) -> Result<(), SendError> {
        self.socket
            .try_send_to(payload, *address)
            .map(|_| ())
            .map_err(|_| SendError)
    }
}

/// Drives a `Server` from a tokio UDP socket: one task reads datagrams,
/// another ticks the reliability timers
pub struct UdpServer;

impl UdpServer {
    pub async fn bind(listen_addr: SocketAddr) -> io::Result<UdpSocket> {
        UdpSocket::bind(listen_addr).await
    }

    /// Runs until the socket fails. After every tick the events raised
    /// since the last one are handed to `on_event`.
    pub async fn run<F>(server: Arc<Server>, socket: UdpSocket, mut on_event: F) -> io::Result<()>
    where
        F: FnMut(ServerEvent) + Send + 'static,
    {
        let socket = Arc::new(socket);
        server.connect_sender(Box::new(UdpPacketSender {
            socket: socket.clone(),
        }));
        info!("gridlink server listening on {}", socket.local_addr()?);

        let tick_server = server.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_server.tick_interval());
            loop {
                interval.tick().await;
                tick_server.tick(Instant::now());
                for event in tick_server.take_events() {
                    on_event(event);
                }
            }
        });

        let mut buffer = vec![0; RECV_BUFFER_SIZE];
        let result = loop {
            match socket.recv_from(&mut buffer).await {
                Ok((length, address)) => {
                    server.receive_packet(address, &buffer[..length], Instant::now());
                }
                Err(error) if error.kind() == io::ErrorKind::ConnectionReset => {
                    // ICMP port unreachable from a departed viewer
                    warn!("udp receive: {}", error);
                }
                Err(error) => break Err(error),
            }
        };

        ticker.abort();
        result
    }
}
