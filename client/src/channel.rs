//! One UDP socket talking to one authority in one wire format.

use log::debug;
use shared::{DecodeError, EncodeError, Message, WireFormat};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::UdpSocket;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
}

/// Cheap to clone; clones share the socket so the simulation and receive
/// loops of a session send and receive on the same local port.
#[derive(Debug, Clone)]
pub struct Channel {
    socket: Arc<UdpSocket>,
    server: SocketAddr,
    format: WireFormat,
}

impl Channel {
    pub async fn bind(server: SocketAddr, format: WireFormat) -> io::Result<Self> {
        let local = if server.ip().is_loopback() {
            "127.0.0.1:0"
        } else {
            "0.0.0.0:0"
        };
        let socket = UdpSocket::bind(local).await?;
        Ok(Self::from_socket(socket, server, format))
    }

    pub fn from_socket(socket: UdpSocket, server: SocketAddr, format: WireFormat) -> Self {
        Self {
            socket: Arc::new(socket),
            server,
            format,
        }
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Fire-and-forget datagram to the authority. Returns the encoded size.
    pub async fn send(&self, msg: &Message) -> Result<usize, ChannelError> {
        let data = self.format.encode(msg)?;
        self.socket.send_to(&data, self.server).await?;
        Ok(data.len())
    }

    /// Waits at most `timeout` for one datagram; `Ok(None)` on timeout.
    pub async fn recv(&self, buffer: &mut [u8], timeout: Duration) -> io::Result<Option<usize>> {
        match tokio::time::timeout(timeout, self.socket.recv_from(buffer)).await {
            Ok(Ok((len, addr))) => {
                debug!("Received {} bytes from {}", len, addr);
                Ok(Some(len))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }

    pub fn decode(&self, data: &[u8]) -> Result<Message, DecodeError> {
        self.format.decode(data)
    }
}
