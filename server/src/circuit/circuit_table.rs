use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Instant};

use parking_lot::{Mutex, MutexGuard, RwLock};

use gridlink_shared::Uuid;

use crate::{
    circuit::{Circuit, CloseReason},
    error::GridlinkServerError,
};

/// Shared handle to one circuit. Holding it does not keep the circuit in
/// the table: once closed it is gone from every lookup.
#[derive(Clone)]
pub struct CircuitRef {
    agent_id: Uuid,
    inner: Arc<Mutex<Circuit>>,
}

impl CircuitRef {
    fn new(circuit: Circuit) -> Self {
        Self {
            agent_id: circuit.agent_id(),
            inner: Arc::new(Mutex::new(circuit)),
        }
    }

    pub fn agent_id(&self) -> Uuid {
        self.agent_id
    }

    /// Exclusive access to the circuit's mutable state
    pub fn lock(&self) -> MutexGuard<'_, Circuit> {
        self.inner.lock()
    }
}

#[derive(Default)]
struct Indices {
    by_agent: HashMap<Uuid, CircuitRef>,
    by_endpoint: HashMap<SocketAddr, Uuid>,
    by_code: HashMap<u32, Uuid>,
}

/// Every live circuit, indexed by agent, bound endpoint and circuit code.
///
/// Lock order is table first, then circuit. No code path takes the table
/// lock while holding a circuit lock.
#[derive(Default)]
pub struct CircuitTable {
    indices: RwLock<Indices>,
}

impl CircuitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, circuit: Circuit) -> Result<CircuitRef, GridlinkServerError> {
        let mut indices = self.indices.write();
        let agent_id = circuit.agent_id();
        let code = circuit.circuit_code();
        if indices.by_agent.contains_key(&agent_id) {
            return Err(GridlinkServerError::CircuitExists { agent_id });
        }
        if indices.by_code.contains_key(&code) {
            return Err(GridlinkServerError::CircuitCodeInUse { code });
        }
        let circuit_ref = CircuitRef::new(circuit);
        indices.by_code.insert(code, agent_id);
        indices.by_agent.insert(agent_id, circuit_ref.clone());
        Ok(circuit_ref)
    }

    pub fn get(&self, agent_id: &Uuid) -> Option<CircuitRef> {
        self.indices.read().by_agent.get(agent_id).cloned()
    }

    pub fn get_by_endpoint(&self, endpoint: &SocketAddr) -> Option<CircuitRef> {
        let indices = self.indices.read();
        let agent_id = indices.by_endpoint.get(endpoint)?;
        indices.by_agent.get(agent_id).cloned()
    }

    pub fn get_by_code(&self, code: u32) -> Option<CircuitRef> {
        let indices = self.indices.read();
        let agent_id = indices.by_code.get(&code)?;
        indices.by_agent.get(agent_id).cloned()
    }

    /// Routes datagrams from `endpoint` to the agent's circuit
    pub fn bind_endpoint(&self, agent_id: &Uuid, endpoint: SocketAddr) -> bool {
        let mut indices = self.indices.write();
        if !indices.by_agent.contains_key(agent_id) {
            return false;
        }
        indices.by_endpoint.insert(endpoint, *agent_id);
        true
    }

    /// Closes the agent's circuit and drops it from every index in one
    /// critical section. `None` if the agent had no circuit.
    pub fn close(&self, agent_id: &Uuid, reason: CloseReason, now: Instant) -> Option<CircuitRef> {
        let mut indices = self.indices.write();
        let circuit_ref = indices.by_agent.remove(agent_id)?;
        {
            let mut circuit = circuit_ref.lock();
            circuit.close(reason, now);
            indices.by_code.remove(&circuit.circuit_code());
            if let Some(endpoint) = circuit.remote_endpoint() {
                if indices.by_endpoint.get(&endpoint) == Some(agent_id) {
                    indices.by_endpoint.remove(&endpoint);
                }
            }
        }
        Some(circuit_ref)
    }

    pub fn circuits(&self) -> Vec<CircuitRef> {
        self.indices.read().by_agent.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.indices.read().by_agent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.read().by_agent.is_empty()
    }
}
