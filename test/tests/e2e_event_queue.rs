/// End-to-End Tests for choosing between UDP and the event queue.
use std::{net::SocketAddrV4, sync::Arc};

use gridlink_server::{
    shared::{
        builtin::{EnableSimulator, EstablishAgentCommunication, RegionHandshake, TeleportFinish},
        serde_json::Value,
        Uuid,
    },
    Delivery, EventQueueError, EventQueueSink, SendError, SendReceipt, ServerConfig,
};
use gridlink_shared::{MessageContainer, MessageError, Variable2};
use gridlink_test::{connect, region_handshake, RecordingEventQueue, TestServer, TestViewer};

fn setup(config: ServerConfig) -> (TestServer, TestViewer) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (server, mut viewer) = TestServer::with_viewer(config, 0xE0E0);
    connect(&server, &mut viewer);
    (server, viewer)
}

fn establish_agent_communication(agent_id: Uuid) -> EstablishAgentCommunication {
    EstablishAgentCommunication {
        agent_id,
        sim_ip_and_port: "10.0.0.5:13001".to_string(),
        seed_capability: "https://sim/cap/seed".to_string(),
    }
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
        teleport_flags: 0,
    }
}

struct FullQueue;

impl EventQueueSink for FullQueue {
    fn enqueue(&self, agent_id: &Uuid, _event: Value) -> Result<(), EventQueueError> {
        Err(EventQueueError::Full {
            agent_id: *agent_id,
        })
    }
}

#[test]
fn event_only_messages_go_to_the_event_queue() {
    let (server, mut viewer) = setup(ServerConfig::default());
    let agent_id = viewer.agent_id();
    let queue = RecordingEventQueue::new();
    server.server.set_event_queue(Arc::new(queue.clone()));

    let receipt = server
        .server
        .send_message(
            &agent_id,
            MessageContainer::new(establish_agent_communication(agent_id)),
            Delivery::Auto,
            server.now(),
        )
        .unwrap();

    assert_eq!(receipt, SendReceipt::EventQueue);
    assert!(viewer.poll().is_empty());
    let events = queue.events();
    assert_eq!(events.len(), 1);
    let (recipient, event) = &events[0];
    assert_eq!(*recipient, agent_id);
    assert_eq!(event["message"], "EstablishAgentCommunication");
    assert_eq!(event["body"]["sim-ip-and-port"], "10.0.0.5:13001");
}

#[test]
fn event_only_message_without_a_queue_fails() {
    let (server, viewer) = setup(ServerConfig::default());
    let agent_id = viewer.agent_id();

    let result = server.server.send_message(
        &agent_id,
        MessageContainer::new(establish_agent_communication(agent_id)),
        Delivery::Auto,
        server.now(),
    );

    assert_eq!(
        result,
        Err(SendError::NoEventQueue {
            name: "EstablishAgentCommunication",
        })
    );
}

#[test]
fn alt_transport_messages_use_udp_unless_preferred() {
    let (server, mut viewer) = setup(ServerConfig::default());
    let agent_id = viewer.agent_id();
    let queue = RecordingEventQueue::new();
    server.server.set_event_queue(Arc::new(queue.clone()));

    let receipt = server
        .server
        .send_message(
            &agent_id,
            MessageContainer::new(teleport_finish(agent_id)),
            Delivery::Auto,
            server.now(),
        )
        .unwrap();

    assert!(matches!(receipt, SendReceipt::Udp(queued) if queued.reliable));
    assert_eq!(viewer.poll_messages::<TeleportFinish>().len(), 1);
    assert!(queue.events().is_empty());
}

#[test]
fn preferred_event_queue_carries_alt_transport_messages() {
    let config = ServerConfig {
        prefer_event_queue: true,
        ..Default::default()
    };
    let (server, mut viewer) = setup(config);
    let agent_id = viewer.agent_id();
    let queue = RecordingEventQueue::new();
    server.server.set_event_queue(Arc::new(queue.clone()));

    let address: SocketAddrV4 = "10.0.0.6:13002".parse().unwrap();
    let receipt = server
        .server
        .send_message(
            &agent_id,
            MessageContainer::new(EnableSimulator::new(0x0003_E800_0003_EA00, address)),
            Delivery::Auto,
            server.now(),
        )
        .unwrap();
    assert_eq!(receipt, SendReceipt::EventQueue);

    // not eligible, so still UDP
    let receipt = server
        .server
        .send_message(
            &agent_id,
            MessageContainer::new(region_handshake()),
            Delivery::Auto,
            server.now(),
        )
        .unwrap();
    assert!(matches!(receipt, SendReceipt::Udp(_)));

    assert_eq!(viewer.poll_messages::<RegionHandshake>().len(), 1);
    assert!(viewer.poll_messages::<EnableSimulator>().is_empty());
    let events = queue.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].1["message"], "EnableSimulator");
    assert_eq!(events[0].1["body"]["SimulatorInfo"][0]["IP"], "10.0.0.6");
}

#[test]
fn forced_delivery_must_fit_the_message() {
    let (server, viewer) = setup(ServerConfig::default());
    let agent_id = viewer.agent_id();
    server
        .server
        .set_event_queue(Arc::new(RecordingEventQueue::new()));

    assert_eq!(
        server.server.send_message(
            &agent_id,
            MessageContainer::new(region_handshake()),
            Delivery::EventQueue,
            server.now(),
        ),
        Err(SendError::Message(MessageError::NotAltTransport {
            name: "RegionHandshake",
        }))
    );
    assert_eq!(
        server.server.send_message(
            &agent_id,
            MessageContainer::new(establish_agent_communication(agent_id)),
            Delivery::Udp,
            server.now(),
        ),
        Err(SendError::Message(MessageError::NotUdpDeliverable {
            name: "EstablishAgentCommunication",
        }))
    );
    assert_eq!(
        server.server.send_message(
            &agent_id,
            MessageContainer::new(teleport_finish(agent_id)),
            Delivery::EventQueue,
            server.now(),
        ),
        Ok(SendReceipt::EventQueue)
    );
}

#[test]
fn full_event_queue_is_reported() {
    let (server, viewer) = setup(ServerConfig::default());
    let agent_id = viewer.agent_id();
    server.server.set_event_queue(Arc::new(FullQueue));

    assert_eq!(
        server.server.send_message(
            &agent_id,
            MessageContainer::new(establish_agent_communication(agent_id)),
            Delivery::Auto,
            server.now(),
        ),
        Err(SendError::EventQueue(EventQueueError::Full { agent_id }))
    );
}
