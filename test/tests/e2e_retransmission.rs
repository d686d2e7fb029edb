/// End-to-End Tests for reliable delivery: acks stop resends, the retransmit
/// policy decides what an exhausted packet does to its circuit, and pings
/// report the oldest packet still waiting for an ack.
use std::time::Duration;

use gridlink_server::{
    shared::{
        builtin::{CloseCircuit, CompletePingCheck, RegionHandshake, StartPingCheck},
        RetransmitPolicy,
    },
    CloseReason, Delivery, PrometheusStats, SendReceipt, ServerConfig, ServerEvent,
};
use gridlink_shared::{MessageContainer, PacketFlags, SequenceNumber};
use gridlink_test::{connect, region_handshake, TestServer, TestViewer};

fn setup(config: ServerConfig) -> (TestServer, TestViewer) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (server, mut viewer) = TestServer::with_viewer(config, 0x2E5E);
    connect(&server, &mut viewer);
    (server, viewer)
}

fn send_region_handshake(server: &TestServer, viewer: &TestViewer) -> SequenceNumber {
    let receipt = server
        .server
        .send_message(
            &viewer.agent_id(),
            MessageContainer::new(region_handshake()),
            Delivery::Udp,
            server.now(),
        )
        .unwrap();
    match receipt {
        SendReceipt::Udp(queued) => queued.sequence,
        SendReceipt::EventQueue => panic!("RegionHandshake went to the event queue"),
    }
}

#[test]
fn appended_ack_stops_resends() {
    let (mut server, mut viewer) = setup(ServerConfig::default());
    let sequence = send_region_handshake(&server, &viewer);
    assert_eq!(viewer.poll_messages::<RegionHandshake>().len(), 1);

    viewer.send_with(CompletePingCheck { ping_id: 0 }, PacketFlags::NONE, 2, &[sequence]);
    server.receive();

    server.advance(Duration::from_secs(1));
    server.tick();
    assert!(viewer.poll_messages::<RegionHandshake>().is_empty());
    let circuit = server.circuit(&viewer.agent_id()).unwrap();
    assert!(!circuit.lock().base.has_pending_acks());
}

#[test]
fn standalone_ack_stops_resends() {
    let (mut server, mut viewer) = setup(ServerConfig::default());
    let sequence = send_region_handshake(&server, &viewer);

    server.advance(Duration::from_secs(1));
    server.tick();
    let resent = viewer.poll_messages::<RegionHandshake>();
    assert_eq!(resent.len(), 2);
    assert!(resent[1].0.flags.is_resent());

    viewer.ack(&[sequence]);
    server.receive();
    server.advance(Duration::from_secs(1));
    server.tick();
    assert!(viewer.poll_messages::<RegionHandshake>().is_empty());
    assert_eq!(server.server.stats().resends, 1);
}

#[test]
fn close_policy_tears_the_circuit_down() {
    let mut config = ServerConfig::default();
    config.circuit.retransmit_policy = RetransmitPolicy::CloseCircuit;
    config.circuit.max_resends = 1;
    let (mut server, mut viewer) = setup(config);
    let agent_id = viewer.agent_id();
    let sequence = send_region_handshake(&server, &viewer);

    server.advance(Duration::from_secs(1));
    server.tick();
    assert_eq!(viewer.poll_messages::<RegionHandshake>().len(), 2);
    assert!(server.server.take_events().is_empty());

    server.advance(Duration::from_secs(1));
    server.tick();
    assert_eq!(
        server.server.take_events(),
        vec![
            ServerEvent::RetransmitExhausted {
                agent_id,
                sequence,
                name: "RegionHandshake",
                retry_count: 1,
            },
            ServerEvent::CircuitClosed {
                agent_id,
                reason: CloseReason::RetransmitExhausted,
            },
        ]
    );
    assert_eq!(server.state(&agent_id), None);
    assert_eq!(viewer.poll_messages::<CloseCircuit>().len(), 1);
}

#[test]
fn ping_reports_the_oldest_unacked_packet() {
    let mut config = ServerConfig::default();
    config.circuit.resend_interval = Duration::from_secs(60);
    let (mut server, mut viewer) = setup(config);
    let sequence = send_region_handshake(&server, &viewer);
    viewer.poll();

    server.advance(Duration::from_secs(5));
    server.tick();
    let pings = viewer.poll_messages::<StartPingCheck>();
    assert_eq!(pings.len(), 1);
    let (_, ping) = &pings[0];
    assert_eq!(ping.oldest_unacked, sequence);

    let circuit = server.circuit(&viewer.agent_id()).unwrap();
    assert_eq!(circuit.lock().base.ping_manager.pending_pings(), 1);
    viewer.send(CompletePingCheck {
        ping_id: ping.ping_id,
    });
    server.receive();
    assert_eq!(circuit.lock().base.ping_manager.pending_pings(), 0);
}

#[test]
fn viewer_ping_is_answered_right_away() {
    let (server, mut viewer) = setup(ServerConfig::default());

    viewer.send(StartPingCheck {
        ping_id: 42,
        oldest_unacked: 1,
    });
    server.receive();

    let pongs = viewer.poll_messages::<CompletePingCheck>();
    assert_eq!(pongs.len(), 1);
    assert_eq!(pongs[0].1.ping_id, 42);
    // the handshake ack rides on the reply
    assert_eq!(pongs[0].0.acks, vec![1]);
}

#[test]
fn resends_reach_the_metrics_registry() {
    let (mut server, viewer) = setup(ServerConfig::default());
    let registry = prometheus::Registry::new();
    let metrics = PrometheusStats::register(&registry).unwrap();
    send_region_handshake(&server, &viewer);

    server.advance(Duration::from_secs(1));
    server.tick();
    metrics.export(&server.server.stats());

    assert_eq!(metrics.value("resends"), 1);
    assert_eq!(metrics.value("packets_out"), server.server.stats().packets_out);
}
