/// End-to-End Tests for the trust gate.
///
/// Trusted messages only ever come from inside the simulator. Untrusted
/// messages only come from the viewer's socket, and must carry the agent
/// and session the circuit was issued for.
use std::time::Duration;

use gridlink_server::{
    shared::{
        builtin::{ChatFromViewer, CloseCircuit, RegionHandshake, TeleportFinish},
        serde_json::json,
        Trust, Uuid,
    },
    CloseReason, DispatchError, GridlinkServerError, HandlerTrust, Origin, ServerConfig,
    ServerEvent, TrustViolation,
};
use gridlink_shared::{MessageContainer, MessageError, Variable2};
use gridlink_test::{chat, connect, region_handshake, DispatchLog, TestServer, TestViewer};

fn setup(config: ServerConfig) -> (TestServer, TestViewer) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (server, mut viewer) = TestServer::with_viewer(config, 0x7A57);
    connect(&server, &mut viewer);
    (server, viewer)
}

fn teleport_finish(agent_id: Uuid) -> TeleportFinish {
    TeleportFinish {
        agent_id,
        location_id: 4,
        sim_ip: [10, 0, 0, 5],
        sim_port: 13001,
        region_handle: 0x0003_E800_0003_E900,
        seed_capability: Variable2::from_str_truncated("https://sim/cap/seed"),
        sim_access: 13,
        teleport_flags: 1 << 4,
    }
}

#[test]
fn trusted_message_on_the_socket_is_refused() {
    let (server, mut viewer) = setup(ServerConfig::default());
    let log = DispatchLog::new();
    server
        .server
        .register_handler::<RegionHandshake, _>(HandlerTrust::Trusted, log.clone())
        .unwrap();

    viewer.send(region_handshake());

    assert_eq!(
        server.receive(),
        vec![ServerEvent::TrustViolation {
            agent_id: viewer.agent_id(),
            violation: TrustViolation::TrustedOnNetwork {
                name: "RegionHandshake",
            },
        }]
    );
    assert!(log.is_empty());
    assert_eq!(server.server.stats().trust_violations, 1);
    let circuit = server.circuit(&viewer.agent_id()).unwrap();
    assert_eq!(circuit.lock().trust_violations(), 1);
}

#[test]
fn spoofed_agent_is_refused() {
    let (server, mut viewer) = setup(ServerConfig::default());
    let log = DispatchLog::new();
    server
        .server
        .register_handler::<ChatFromViewer, _>(HandlerTrust::Untrusted, log.clone())
        .unwrap();
    let someone_else = Uuid::from_u128(0x0BAD);

    viewer.send(chat(someone_else, viewer.session_id(), "it was me"));

    assert_eq!(
        server.receive(),
        vec![ServerEvent::TrustViolation {
            agent_id: viewer.agent_id(),
            violation: TrustViolation::AgentMismatch {
                name: "ChatFromViewer",
                claimed: someone_else,
                expected: viewer.agent_id(),
            },
        }]
    );
    assert!(log.is_empty());
}

#[test]
fn spoofed_session_is_refused() {
    let (server, mut viewer) = setup(ServerConfig::default());
    let stale_session = Uuid::from_u128(0x01D);

    viewer.send(chat(viewer.agent_id(), stale_session, "hi"));

    assert_eq!(
        server.receive(),
        vec![ServerEvent::TrustViolation {
            agent_id: viewer.agent_id(),
            violation: TrustViolation::SessionMismatch {
                name: "ChatFromViewer",
                claimed: stale_session,
                expected: viewer.session_id(),
            },
        }]
    );
}

#[test]
fn matching_identity_reaches_handlers() {
    let (server, mut viewer) = setup(ServerConfig::default());
    let log = DispatchLog::new();
    server
        .server
        .register_handler::<ChatFromViewer, _>(HandlerTrust::Untrusted, log.clone())
        .unwrap();

    viewer.send(chat(viewer.agent_id(), viewer.session_id(), "hi"));

    assert!(server.receive().is_empty());
    assert_eq!(log.len(), 1);
    let (context, _) = log.entries().remove(0);
    assert_eq!(context.origin, Origin::Network);
    assert_eq!(context.session_id, viewer.session_id());
}

#[test]
fn repeated_violations_close_the_circuit() {
    let mut config = ServerConfig::default();
    config.circuit.max_trust_violations = 3;
    let (mut server, mut viewer) = setup(config);
    let agent_id = viewer.agent_id();
    // get the handshake ack out of the way
    server.advance(Duration::from_millis(100));
    server.tick();
    viewer.poll();

    viewer.send(region_handshake());
    viewer.send(region_handshake());
    assert_eq!(server.receive().len(), 2);
    assert!(server.state(&agent_id).is_some());

    viewer.send(region_handshake());
    let events = server.receive();
    assert_eq!(
        events.last(),
        Some(&ServerEvent::CircuitClosed {
            agent_id,
            reason: CloseReason::TrustViolations,
        })
    );
    assert_eq!(server.state(&agent_id), None);
    assert_eq!(viewer.poll_messages::<CloseCircuit>().len(), 1);

    // nothing is read from that endpoint anymore
    viewer.send(chat(agent_id, viewer.session_id(), "still here?"));
    assert!(matches!(
        server.receive().as_slice(),
        [ServerEvent::HandshakeRejected { .. }]
    ));
}

#[test]
fn internal_messages_must_be_trusted() {
    let (server, viewer) = setup(ServerConfig::default());
    let agent_id = viewer.agent_id();
    let log = DispatchLog::new();
    server
        .server
        .register_handler::<TeleportFinish, _>(HandlerTrust::Trusted, log.clone())
        .unwrap();

    let outcome = server
        .server
        .inject_internal(&agent_id, MessageContainer::new(teleport_finish(agent_id)))
        .unwrap();
    assert_eq!(outcome.invoked, 1);
    let (context, _) = log.entries().remove(0);
    assert_eq!(context.origin, Origin::Internal);

    let spoofed = chat(agent_id, viewer.session_id(), "from inside");
    let result = server
        .server
        .inject_internal(&agent_id, MessageContainer::new(spoofed));
    assert_eq!(
        result.unwrap_err(),
        GridlinkServerError::TrustViolation(TrustViolation::UntrustedInternal {
            name: "ChatFromViewer",
        })
    );

    // internal mistakes do not count against the viewer
    let circuit = server.circuit(&agent_id).unwrap();
    assert_eq!(circuit.lock().trust_violations(), 0);
    assert_eq!(server.server.stats().trust_violations, 1);
}

#[test]
fn structured_events_dispatch_as_internal_traffic() {
    let (server, viewer) = setup(ServerConfig::default());
    let agent_id = viewer.agent_id();
    let log = DispatchLog::new();
    server
        .server
        .register_handler::<TeleportFinish, _>(HandlerTrust::Trusted, log.clone())
        .unwrap();

    let teleport = MessageContainer::new(teleport_finish(agent_id));
    let event = server.server.message_kinds().to_structured(&teleport).unwrap();
    assert_eq!(event["message"], "TeleportFinish");
    assert_eq!(event["body"]["Info"][0]["SimIP"], "10.0.0.5");

    let outcome = server.server.receive_event(&agent_id, &event).unwrap();
    assert_eq!(outcome.invoked, 1);
    let (context, message) = log.entries().remove(0);
    assert_eq!(context.origin, Origin::Internal);
    assert_eq!(
        message.into_message::<TeleportFinish>(),
        Some(teleport_finish(agent_id))
    );
}

#[test]
fn malformed_structured_events_are_refused() {
    let (server, viewer) = setup(ServerConfig::default());
    let agent_id = viewer.agent_id();

    assert_eq!(
        server
            .server
            .receive_event(&agent_id, &json!({ "body": {} }))
            .unwrap_err(),
        GridlinkServerError::MalformedEvent {
            reason: "missing message name",
        }
    );
    assert_eq!(
        server
            .server
            .receive_event(&agent_id, &json!({ "message": "NoSuchMessage", "body": {} }))
            .unwrap_err(),
        GridlinkServerError::Message(MessageError::UnknownMessageName {
            name: "NoSuchMessage".to_string(),
        })
    );
    assert_eq!(
        server
            .server
            .receive_event(
                &agent_id,
                &json!({ "message": "EnableSimulator", "body": { "SimulatorInfo": [] } })
            )
            .unwrap_err(),
        GridlinkServerError::Message(MessageError::StructuredDecode {
            name: "EnableSimulator",
        })
    );
}

#[test]
fn handlers_must_match_the_message_trust() {
    let (server, _viewer) = setup(ServerConfig::default());

    let result = server
        .server
        .register_handler::<ChatFromViewer, _>(HandlerTrust::Trusted, DispatchLog::new());
    assert_eq!(
        result,
        Err(DispatchError::TrustMismatch {
            name: "ChatFromViewer",
            declared: HandlerTrust::Trusted,
            trust: Trust::NotTrusted,
        })
    );

    let result = server
        .server
        .register_handler::<RegionHandshake, _>(HandlerTrust::Untrusted, DispatchLog::new());
    assert!(result.is_err());

    assert!(server
        .server
        .register_handler::<RegionHandshake, _>(HandlerTrust::Any, DispatchLog::new())
        .is_ok());
}
