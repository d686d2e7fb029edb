pub mod builtin;
pub mod error;
pub mod identity;
pub mod message;
pub mod message_container;
pub mod message_kind;
pub mod message_kinds;
pub mod meta;
pub mod structured;
