//! Binary tagged-union encoding.
//!
//! The layout is whatever `bincode` produces for the serde derive of
//! [`Message`]; compatibility is defined by the schema, not the bytes.

use crate::{DecodeError, EncodeError, Message};
use bincode::Options;

fn options() -> impl Options {
    bincode::DefaultOptions::new().reject_trailing_bytes()
}

pub fn encode(msg: &Message) -> Result<Vec<u8>, EncodeError> {
    Ok(options().serialize(msg)?)
}

/// Decodes exactly one message. Unknown tags, truncated payloads and bytes
/// left over after the first message are all `MalformedPacket`.
pub fn decode(data: &[u8]) -> Result<Message, DecodeError> {
    options()
        .deserialize(data)
        .map_err(|e| DecodeError::MalformedPacket(e.to_string()))
}
