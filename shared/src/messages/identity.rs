use gridlink_serde::Uuid;

/// Agent and session ids a message claims to be sent on behalf of
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AgentIdentity {
    pub agent_id: Uuid,
    pub session_id: Uuid,
}

impl AgentIdentity {
    pub fn new(agent_id: Uuid, session_id: Uuid) -> Self {
        Self {
            agent_id,
            session_id,
        }
    }
}
