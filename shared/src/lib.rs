//! # Shared Protocol Library
//!
//! Wire-level definitions shared by the stress client, the snapshot viewer and
//! the test authority: the [`Message`] model, both wire encodings and the
//! protocol constants.
//!
//! ## Wire formats
//!
//! The protocol exists in two independent encodings of the same logical model:
//!
//! - **Text**: colon-delimited UTF-8 datagrams such as `HELLO`, `WELCOME:7`,
//!   `PING:7` and `UPDATE:7:120:44`. Server broadcasts are detected by scanning
//!   for `GAME:STARTED` and `TICK=<n>` anywhere in the payload.
//! - **Binary**: a serde tagged union serialized with `bincode`.
//!
//! A [`WireFormat`] is chosen by configuration and never sniffed at runtime, so
//! peers must agree on it out of band.
//!
//! ```rust
//! use shared::{Message, WireFormat};
//!
//! let msg = Message::ClientUpdate { id: 3, x: 10, y: 20 };
//! let bytes = WireFormat::Text.encode(&msg).unwrap();
//! assert_eq!(bytes, b"UPDATE:3:10:20");
//! assert_eq!(WireFormat::Text.decode(&bytes).unwrap(), msg);
//! ```

pub mod codec;
pub mod error;
pub mod message;

pub use codec::WireFormat;
pub use error::{DecodeError, EncodeError};
pub use message::{GameState, Message, PlayerState};

/// Default UDP port of the authoritative server.
pub const SERVER_PORT: u16 = 9000;
/// Default UDP port the snapshot viewer listens on.
pub const VIEWER_PORT: u16 = 9999;

/// Cadence of pings and position updates, in milliseconds.
pub const SEND_INTERVAL_MS: u64 = 100;
/// Per-call receive timeout, in milliseconds.
pub const RECV_POLL_MS: u64 = 200;

/// Receive buffer for the handshake reply.
pub const HANDSHAKE_BUFFER_SIZE: usize = 1024;
/// Receive buffer large enough for a full snapshot.
pub const RECV_BUFFER_SIZE: usize = 4096;

/// Upper bound of both axes for the random-walk movement rule.
pub const CANVAS_BOUND: i32 = 1500;
/// Per-axis displacement choices for the random-walk movement rule.
pub const WALK_STEPS: [i32; 5] = [-20, -2, 0, 2, 20];
