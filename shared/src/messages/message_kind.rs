use std::any::TypeId;

use crate::messages::message::MessageDecl;

/// Identifies a registered message type
#[derive(Eq, Hash, Copy, Clone, PartialEq, Debug)]
pub struct MessageKind {
    type_id: TypeId,
}

impl MessageKind {
    pub fn of<M: MessageDecl>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
        }
    }
}
