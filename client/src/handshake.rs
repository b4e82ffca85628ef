//! HELLO / WELCOME exchange that opens a session.

use crate::channel::{Channel, ChannelError};
use shared::message::ClientId;
use shared::{Message, HANDSHAKE_BUFFER_SIZE};
use std::time::Duration;
use thiserror::Error;

/// Fatal for the one session that attempted the handshake, never for others.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("no welcome within {timeout:?}")]
    NoWelcome { timeout: Duration },

    #[error("invalid welcome: {0}")]
    InvalidWelcome(String),

    #[error("handshake transport failure: {0}")]
    Transport(#[from] ChannelError),
}

/// Sends a single `Hello` and waits up to `timeout` for the reply.
///
/// No retries: a caller that wants them wraps this call. The returned id must
/// be echoed in every `Ping` and `ClientUpdate` of the session.
pub async fn handshake(channel: &Channel, timeout: Duration) -> Result<ClientId, HandshakeError> {
    channel.send(&Message::Hello).await?;

    let mut buffer = [0u8; HANDSHAKE_BUFFER_SIZE];
    let len = channel
        .recv(&mut buffer, timeout)
        .await
        .map_err(ChannelError::from)?
        .ok_or(HandshakeError::NoWelcome { timeout })?;

    match channel.decode(&buffer[..len]) {
        Ok(Message::Welcome { id }) => Ok(id),
        Ok(other) => Err(HandshakeError::InvalidWelcome(format!(
            "expected welcome, got {}",
            other.kind()
        ))),
        Err(e) => Err(HandshakeError::InvalidWelcome(e.to_string())),
    }
}
