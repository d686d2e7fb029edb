use std::{collections::VecDeque, net::SocketAddr, sync::Arc};

use parking_lot::Mutex;

use super::{PacketReceiver, PacketSender, RecvError, SendError};

type Queue = Arc<Mutex<VecDeque<(SocketAddr, Box<[u8]>)>>>;

/// In-memory datagram pipe. The address travelling with a datagram is
/// whatever the sending side passes in.
pub struct PacketChannel;

impl PacketChannel {
    pub fn unbounded() -> (PacketChannelSender, PacketChannelReceiver) {
        let queue: Queue = Arc::new(Mutex::new(VecDeque::new()));
        (
            PacketChannelSender {
                queue: queue.clone(),
            },
            PacketChannelReceiver {
                queue,
                current_payload: None,
            },
        )
    }
}

#[derive(Clone)]
pub struct PacketChannelSender {
    queue: Queue,
}

impl PacketSender for PacketChannelSender {
    fn send(&self, address: &SocketAddr, payload: &[u8]) -> Result<(), SendError> {
        self.queue.lock().push_back((*address, payload.into()));
        Ok(())
    }
}

pub struct PacketChannelReceiver {
    queue: Queue,
    current_payload: Option<Box<[u8]>>,
}

impl PacketChannelReceiver {
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

impl PacketReceiver for PacketChannelReceiver {
    fn receive(&mut self) -> Result<Option<(SocketAddr, &[u8])>, RecvError> {
        let Some((address, payload)) = self.queue.lock().pop_front() else {
            return Ok(None);
        };
        let payload: &[u8] = self.current_payload.insert(payload);
        Ok(Some((address, payload)))
    }
}
