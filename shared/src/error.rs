use thiserror::Error;

/// Failure to turn a datagram into a [`Message`](crate::Message).
///
/// Always recoverable: receivers drop or log the datagram and carry on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed {field} field: {value:?}")]
    MalformedField { field: &'static str, value: String },

    #[error("unknown message type: {0:?}")]
    UnknownMessageType(String),

    #[error("malformed packet: {0}")]
    MalformedPacket(String),
}

impl DecodeError {
    pub(crate) fn field(field: &'static str, value: &str) -> Self {
        DecodeError::MalformedField {
            field,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Error)]
#[error("encode error: {0}")]
pub struct EncodeError(#[from] bincode::Error);
