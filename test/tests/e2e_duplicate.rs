/// End-to-End Tests for inbound duplicate suppression.
///
/// A viewer that misses our ack resends the same sequence number. The
/// server must ack it again so the viewer stops resending, but handlers
/// only ever see the first copy.
use std::time::Duration;

use gridlink_server::{
    shared::builtin::{ChatFromViewer, CompletePingCheck},
    HandlerTrust, ServerConfig,
};
use gridlink_shared::{PacketFlags, WINDOW_SIZE};
use gridlink_test::{acked_sequences, chat, connect, DispatchLog, TestServer, TestViewer};

fn setup() -> (TestServer, TestViewer, DispatchLog) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (mut server, mut viewer) = TestServer::with_viewer(ServerConfig::default(), 0x0D0B);
    connect(&server, &mut viewer);
    // flush the handshake ack out of the way
    server.advance(Duration::from_millis(100));
    server.tick();
    viewer.poll();

    let log = DispatchLog::new();
    server
        .server
        .register_handler::<ChatFromViewer, _>(HandlerTrust::Untrusted, log.clone())
        .unwrap();
    (server, viewer, log)
}

#[test]
fn duplicate_is_acked_twice_and_dispatched_once() {
    let (mut server, mut viewer, log) = setup();
    let message = chat(viewer.agent_id(), viewer.session_id(), "hello");

    viewer.send_with_sequence(message.clone(), 100);
    server.receive();
    server.advance(Duration::from_millis(100));
    server.tick();
    let first = viewer.poll();

    viewer.send_with(message, PacketFlags::RESENT, 100, &[]);
    server.receive();
    server.advance(Duration::from_millis(100));
    server.tick();
    let second = viewer.poll();

    assert_eq!(acked_sequences(&viewer, &first), vec![100]);
    assert_eq!(acked_sequences(&viewer, &second), vec![100]);
    assert_eq!(log.len(), 1);
    let (_, dispatched) = log.entries().remove(0);
    assert_eq!(
        dispatched
            .downcast_ref::<ChatFromViewer>()
            .unwrap()
            .message
            .to_string_lossy(),
        "hello"
    );
    assert_eq!(server.server.stats().duplicates, 1);
}

#[test]
fn copies_arriving_together_share_one_owed_ack() {
    let (mut server, mut viewer, log) = setup();
    let message = chat(viewer.agent_id(), viewer.session_id(), "twice");

    viewer.send_with_sequence(message.clone(), 100);
    viewer.send_with(message, PacketFlags::RESENT, 100, &[]);
    server.receive();
    server.advance(Duration::from_millis(100));
    server.tick();

    let packets = viewer.poll();
    assert_eq!(acked_sequences(&viewer, &packets), vec![100]);
    assert_eq!(log.len(), 1);
}

#[test]
fn unreliable_duplicate_is_dropped_without_ack() {
    let (mut server, mut viewer, _) = setup();
    let update = CompletePingCheck { ping_id: 9 };

    viewer.send_with_sequence(update.clone(), 50);
    viewer.send_with_sequence(update, 50);
    server.receive();
    server.advance(Duration::from_millis(100));
    server.tick();

    let packets = viewer.poll();
    assert!(acked_sequences(&viewer, &packets).is_empty());
    assert_eq!(server.server.stats().duplicates, 1);
}

#[test]
fn old_sequence_outside_the_window_is_stale() {
    let (mut server, mut viewer, log) = setup();
    let message = chat(viewer.agent_id(), viewer.session_id(), "late");

    viewer.send_with_sequence(message.clone(), 5000);
    viewer.send_with_sequence(message, 5000 - WINDOW_SIZE as u32 - 1);
    server.receive();
    server.advance(Duration::from_millis(100));
    server.tick();

    let packets = viewer.poll();
    assert_eq!(acked_sequences(&viewer, &packets), vec![5000]);
    assert_eq!(log.len(), 1);
    assert_eq!(server.server.stats().stale_drops, 1);
}
