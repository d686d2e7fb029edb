/// End-to-End Tests for the UseCircuitCode handshake and the retransmission
/// ceiling on a freshly established circuit.
///
/// Scenario for the retransmission ceiling:
/// 1. Server issues circuit code 0x7F2A to an agent
/// 2. Viewer presents the code from its endpoint
/// 3. Circuit becomes Established and the handshake is acked
/// 4. Server sends RegionHandshake reliably on sequence 10
/// 5. Viewer never acks it: three resends go out, one per resend interval
/// 6. The next tick abandons the packet, the circuit stays up but degraded
use std::{net::SocketAddr, time::Duration};

use gridlink_server::{
    shared::builtin::{CompletePingCheck, PacketAck, RegionHandshake, UseCircuitCode},
    CircuitState, CloseReason, Delivery, HandlerTrust, HandshakeError, SendReceipt, ServerConfig,
    ServerEvent,
};
use gridlink_shared::{MessageContainer, PacketFlags, QueuedMessage, SequenceNumber, Uuid};
use gridlink_test::{
    acked_sequences, chat, connect, region_handshake, DispatchLog, TestServer, TestViewer,
};

const CIRCUIT_CODE: u32 = 0x7F2A;

fn setup() -> (TestServer, TestViewer) {
    let _ = env_logger::builder().is_test(true).try_init();
    TestServer::with_viewer(ServerConfig::default(), CIRCUIT_CODE)
}

fn next_sequence(server: &TestServer, agent_id: &Uuid) -> SequenceNumber {
    let circuit = server.circuit(agent_id).unwrap();
    let sequence = circuit.lock().base.ack_manager().peek_outgoing_sequence();
    sequence
}

#[test]
fn use_circuit_code_establishes_the_circuit() {
    let (mut server, mut viewer) = setup();
    let agent_id = viewer.agent_id();
    let log = DispatchLog::new();
    server
        .server
        .register_handler::<UseCircuitCode, _>(HandlerTrust::Untrusted, log.clone())
        .unwrap();
    assert_eq!(server.state(&agent_id), Some(CircuitState::Handshaking));

    let handshake_sequence = viewer.use_circuit_code();
    let events = server.receive();

    assert_eq!(
        events,
        vec![ServerEvent::CircuitEstablished {
            agent_id,
            endpoint: viewer.address(),
        }]
    );
    assert_eq!(server.state(&agent_id), Some(CircuitState::Established));
    let circuit = server.circuit(&agent_id).unwrap();
    assert_eq!(circuit.lock().remote_endpoint(), Some(viewer.address()));

    // handlers see the handshake once, as network traffic
    assert_eq!(log.len(), 1);
    let (context, message) = log.entries().remove(0);
    assert_eq!(context.agent_id, agent_id);
    assert_eq!(context.endpoint, Some(viewer.address()));
    assert!(message.is::<UseCircuitCode>());

    // the ack waits for a packet to ride on, then goes out on its own
    assert!(viewer.poll().is_empty());
    server.advance(Duration::from_millis(100));
    server.tick();
    let packets = viewer.poll();
    assert_eq!(acked_sequences(&viewer, &packets), vec![handshake_sequence]);
}

#[test]
fn unacked_region_handshake_is_resent_three_times_then_abandoned() {
    let (mut server, mut viewer) = setup();
    let agent_id = viewer.agent_id();
    connect(&server, &mut viewer);

    // fill sequences 1..=9 with unreliable traffic
    while next_sequence(&server, &agent_id) < 10 {
        let filler = MessageContainer::new(CompletePingCheck { ping_id: 0 });
        server
            .server
            .send_message(&agent_id, filler, Delivery::Udp, server.now())
            .unwrap();
    }
    let receipt = server
        .server
        .send_message(
            &agent_id,
            MessageContainer::new(region_handshake()),
            Delivery::Udp,
            server.now(),
        )
        .unwrap();
    assert_eq!(
        receipt,
        SendReceipt::Udp(QueuedMessage {
            sequence: 10,
            reliable: true,
            throttled: false,
        })
    );

    let packets = viewer.poll();
    assert_eq!(packets.len(), 10);
    // the handshake ack rode on the first filler
    assert_eq!(packets[0].acks, vec![1]);
    let original = packets.last().unwrap();
    assert_eq!(original.sequence, 10);
    assert!(original.flags.is_reliable());
    assert!(!original.flags.is_resent());
    assert!(viewer.decode(original).is::<RegionHandshake>());

    for _ in 0..3 {
        server.advance(Duration::from_secs(1));
        server.tick();
        let resent = viewer.poll_messages::<RegionHandshake>();
        assert_eq!(resent.len(), 1);
        let (packet, message) = &resent[0];
        assert_eq!(packet.sequence, 10);
        assert!(packet.flags.contains(PacketFlags::RELIABLE | PacketFlags::RESENT));
        assert_eq!(message, &region_handshake());
    }

    server.advance(Duration::from_secs(1));
    server.tick();
    assert!(viewer.poll_messages::<RegionHandshake>().is_empty());
    assert_eq!(
        server.server.take_events(),
        vec![ServerEvent::RetransmitExhausted {
            agent_id,
            sequence: 10,
            name: "RegionHandshake",
            retry_count: 3,
        }]
    );

    let circuit = server.circuit(&agent_id).unwrap();
    {
        let circuit = circuit.lock();
        assert_eq!(circuit.state(), CircuitState::Established);
        assert!(circuit.is_degraded());
        assert!(!circuit.base.ack_manager().is_pending(10));
    }
    let stats = server.server.stats();
    assert_eq!(stats.resends, 3);
    assert_eq!(stats.retransmit_exhaustions, 1);
}

#[test]
fn unknown_code_is_rejected() {
    let (server, mut viewer) = setup();
    let agent_id = viewer.agent_id();
    viewer.send(UseCircuitCode {
        code: 0xBAD,
        session_id: viewer.session_id(),
        agent_id,
    });

    assert_eq!(
        server.receive(),
        vec![ServerEvent::HandshakeRejected {
            endpoint: viewer.address(),
            error: HandshakeError::UnknownCode { code: 0xBAD },
        }]
    );
    assert_eq!(server.state(&agent_id), Some(CircuitState::Handshaking));
    assert_eq!(server.server.stats().handshake_failures, 1);
}

#[test]
fn mismatched_identity_is_rejected() {
    let (server, mut viewer) = setup();
    let impostor = Uuid::from_u128(0xBAD);
    viewer.send(UseCircuitCode {
        code: CIRCUIT_CODE,
        session_id: viewer.session_id(),
        agent_id: impostor,
    });

    assert_eq!(
        server.receive(),
        vec![ServerEvent::HandshakeRejected {
            endpoint: viewer.address(),
            error: HandshakeError::IdentityMismatch {
                code: CIRCUIT_CODE,
                agent_id: impostor,
            },
        }]
    );
    assert_eq!(
        server.state(&viewer.agent_id()),
        Some(CircuitState::Handshaking)
    );
}

#[test]
fn first_message_must_be_use_circuit_code() {
    let (server, mut viewer) = setup();
    let message = chat(viewer.agent_id(), viewer.session_id(), "hello?");
    viewer.send(message);

    assert_eq!(
        server.receive(),
        vec![ServerEvent::HandshakeRejected {
            endpoint: viewer.address(),
            error: HandshakeError::UnexpectedMessage {
                endpoint: viewer.address(),
                name: "ChatFromViewer",
            },
        }]
    );
    assert_eq!(
        server.state(&viewer.agent_id()),
        Some(CircuitState::Handshaking)
    );
}

#[test]
fn code_bound_to_one_endpoint_is_refused_elsewhere() {
    let (server, mut viewer) = setup();
    connect(&server, &mut viewer);

    let other: SocketAddr = "127.0.0.1:13999".parse().unwrap();
    let stolen = UseCircuitCode {
        code: CIRCUIT_CODE,
        session_id: viewer.session_id(),
        agent_id: viewer.agent_id(),
    };
    let bytes = viewer
        .message_kinds()
        .build_packet(&MessageContainer::new(stolen), PacketFlags::NONE, 1, &[])
        .unwrap();
    viewer.send_raw_from(other, &bytes);

    assert_eq!(
        server.receive(),
        vec![ServerEvent::HandshakeRejected {
            endpoint: other,
            error: HandshakeError::AlreadyBound {
                code: CIRCUIT_CODE,
                endpoint: viewer.address(),
            },
        }]
    );
    let circuit = server.circuit(&viewer.agent_id()).unwrap();
    assert_eq!(circuit.lock().remote_endpoint(), Some(viewer.address()));
}

#[test]
fn resent_handshake_is_acked_again_but_not_redispatched() {
    let (mut server, mut viewer) = setup();
    let log = DispatchLog::new();
    server
        .server
        .register_handler::<UseCircuitCode, _>(HandlerTrust::Untrusted, log.clone())
        .unwrap();
    let sequence = viewer.use_circuit_code();
    server.receive();

    let again = UseCircuitCode {
        code: CIRCUIT_CODE,
        session_id: viewer.session_id(),
        agent_id: viewer.agent_id(),
    };
    viewer.send_with(again, PacketFlags::RESENT, sequence, &[]);
    assert!(server.receive().is_empty());

    server.advance(Duration::from_millis(100));
    server.tick();
    let packets = viewer.poll();
    assert_eq!(acked_sequences(&viewer, &packets), vec![sequence]);
    assert_eq!(log.len(), 1);
    assert_eq!(server.server.stats().duplicates, 1);
}

#[test]
fn unused_circuit_code_times_out() {
    let (mut server, mut viewer) = setup();
    let agent_id = viewer.agent_id();

    server.advance(Duration::from_secs(29));
    server.tick();
    assert_eq!(server.state(&agent_id), Some(CircuitState::Handshaking));

    server.advance(Duration::from_secs(1));
    server.tick();
    assert_eq!(server.state(&agent_id), None);
    assert_eq!(
        server.server.take_events(),
        vec![ServerEvent::CircuitClosed {
            agent_id,
            reason: CloseReason::HandshakeTimeout,
        }]
    );

    // the code is gone with the circuit
    viewer.use_circuit_code();
    assert_eq!(
        server.receive(),
        vec![ServerEvent::HandshakeRejected {
            endpoint: viewer.address(),
            error: HandshakeError::UnknownCode { code: CIRCUIT_CODE },
        }]
    );
}

#[test]
fn rejected_strangers_cannot_grow_the_event_buffer() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = ServerConfig {
        max_buffered_events: 8,
        ..Default::default()
    };
    let (server, viewer) = TestServer::with_viewer(config, CIRCUIT_CODE);
    let ack = PacketAck::new(vec![1]).unwrap();
    let bytes = viewer
        .message_kinds()
        .build_packet(&MessageContainer::new(ack), PacketFlags::NONE, 1, &[])
        .unwrap();

    for port in 20_000..20_050 {
        let stranger: SocketAddr = SocketAddr::from(([127, 0, 0, 1], port));
        viewer.send_raw_from(stranger, &bytes);
    }
    let events = server.receive();

    assert_eq!(events.len(), 8);
    let endpoints: Vec<u16> = events
        .iter()
        .map(|event| match event {
            ServerEvent::HandshakeRejected { endpoint, .. } => endpoint.port(),
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(endpoints, (20_042..20_050).collect::<Vec<u16>>());
    let stats = server.server.stats();
    assert_eq!(stats.handshake_failures, 50);
    assert_eq!(stats.dropped_events, 42);
}
