//! Helpers for the event queue form of a message body. Each block is an
//! array of maps keyed by field name, the layout long-poll viewers expect.

use serde_json::{Map, Value};

use gridlink_serde::Uuid;

/// First entry of the named block
pub fn block<'a>(body: &'a Value, name: &str) -> Option<&'a Map<String, Value>> {
    body.get(name)?.as_array()?.first()?.as_object()
}

pub fn uuid_field(block: &Map<String, Value>, key: &str) -> Option<Uuid> {
    Uuid::parse_str(block.get(key)?.as_str()?).ok()
}

pub fn u64_field(block: &Map<String, Value>, key: &str) -> Option<u64> {
    block.get(key)?.as_u64()
}

pub fn u32_field(block: &Map<String, Value>, key: &str) -> Option<u32> {
    u32::try_from(u64_field(block, key)?).ok()
}

pub fn str_field<'a>(block: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    block.get(key)?.as_str()
}
