use gridlink_server::ServerEvent;
use gridlink_shared::{builtin::PacketAck, Packet, SequenceNumber};

use super::{TestServer, TestViewer};

/// Lets the server read what the viewer sent, tick once, and hands back
/// what the viewer received
pub fn exchange_packets(server: &TestServer, viewer: &mut TestViewer) -> (Vec<ServerEvent>, Vec<Packet>) {
    let events = server.receive();
    server.tick();
    (events, viewer.poll())
}

/// Completes the `UseCircuitCode` handshake, returning the events raised
pub fn connect(server: &TestServer, viewer: &mut TestViewer) -> Vec<ServerEvent> {
    viewer.use_circuit_code();
    server.receive()
}

/// Every sequence number acked by `packets`, appended or standalone
pub fn acked_sequences(viewer: &TestViewer, packets: &[Packet]) -> Vec<SequenceNumber> {
    let mut acked = Vec::new();
    for packet in packets {
        acked.extend_from_slice(&packet.acks);
        if let Some(ack) = viewer.decode(packet).downcast_ref::<PacketAck>() {
            acked.extend_from_slice(ack.ids());
        }
    }
    acked
}
