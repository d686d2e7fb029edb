use std::net::SocketAddr;

use gridlink_server::transport::{
    channel::{PacketChannelReceiver, PacketChannelSender},
    PacketReceiver, PacketSender,
};
use gridlink_shared::{
    builtin::{PacketAck, UseCircuitCode},
    MessageContainer, MessageDecl, MessageKinds, Packet, PacketFlags, SequenceNumber, Uuid,
};

use crate::protocol;

/// Viewer end of a circuit: writes datagrams the way a viewer would and
/// parses what the server sends back
pub struct TestViewer {
    address: SocketAddr,
    agent_id: Uuid,
    session_id: Uuid,
    circuit_code: u32,
    sender: PacketChannelSender,
    receiver: PacketChannelReceiver,
    message_kinds: MessageKinds,
    next_sequence: SequenceNumber,
}

impl TestViewer {
    pub fn new(
        address: SocketAddr,
        agent_id: Uuid,
        session_id: Uuid,
        circuit_code: u32,
        sender: PacketChannelSender,
        receiver: PacketChannelReceiver,
    ) -> Self {
        Self {
            address,
            agent_id,
            session_id,
            circuit_code,
            sender,
            receiver,
            message_kinds: protocol().message_kinds,
            next_sequence: 1,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn agent_id(&self) -> Uuid {
        self.agent_id
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn message_kinds(&self) -> &MessageKinds {
        &self.message_kinds
    }

    // Sending

    /// Sends `message` on the next sequence number
    pub fn send<M: MessageDecl>(&mut self, message: M) -> SequenceNumber {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.send_with_sequence(message, sequence);
        sequence
    }

    pub fn send_with_sequence<M: MessageDecl>(&self, message: M, sequence: SequenceNumber) {
        self.send_with(message, PacketFlags::NONE, sequence, &[]);
    }

    pub fn send_with<M: MessageDecl>(
        &self,
        message: M,
        extra_flags: PacketFlags,
        sequence: SequenceNumber,
        acks: &[SequenceNumber],
    ) {
        let bytes = self
            .message_kinds
            .build_packet(&MessageContainer::new(message), extra_flags, sequence, acks)
            .unwrap();
        self.send_raw(&bytes);
    }

    pub fn send_raw(&self, bytes: &[u8]) {
        self.send_raw_from(self.address, bytes);
    }

    /// Datagram that appears to come from `address`
    pub fn send_raw_from(&self, address: SocketAddr, bytes: &[u8]) {
        self.sender.send(&address, bytes).unwrap();
    }

    pub fn use_circuit_code(&mut self) -> SequenceNumber {
        let message = UseCircuitCode {
            code: self.circuit_code,
            session_id: self.session_id,
            agent_id: self.agent_id,
        };
        self.send(message)
    }

    /// Acks `sequences` with a standalone `PacketAck`
    pub fn ack(&mut self, sequences: &[SequenceNumber]) {
        let ack = PacketAck::new(sequences.to_vec()).unwrap();
        self.send(ack);
    }

    // Receiving

    /// Every datagram the server sent since the last poll
    pub fn poll(&mut self) -> Vec<Packet> {
        let mut packets = Vec::new();
        while let Ok(Some((to, payload))) = self.receiver.receive() {
            assert_eq!(to, self.address);
            packets.push(Packet::parse(payload).unwrap());
        }
        packets
    }

    pub fn decode(&self, packet: &Packet) -> MessageContainer {
        self.message_kinds.read_body(&packet.body).unwrap()
    }

    /// Polls and decodes, keeping only messages of type `M`
    pub fn poll_messages<M: MessageDecl>(&mut self) -> Vec<(Packet, M)> {
        let packets = self.poll();
        packets
            .into_iter()
            .filter_map(|packet| {
                let message = self.decode(&packet).into_message::<M>()?;
                Some((packet, message))
            })
            .collect()
    }
}
