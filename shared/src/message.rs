//! Logical protocol model shared by both wire formats.

use serde::{Deserialize, Serialize};

/// Session identifier assigned by the server in `Welcome`.
pub type ClientId = u32;

/// Server simulation step number carried by state broadcasts.
pub type Tick = u32;

/// Lifecycle phase announced by the server in every broadcast.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Waiting,
    Started,
    Ended,
}

impl GameState {
    pub const ALL: [GameState; 3] = [GameState::Waiting, GameState::Started, GameState::Ended];

    /// Upper-case name used by the text format (`GAME:STARTED`).
    pub fn as_str(self) -> &'static str {
        match self {
            GameState::Waiting => "WAITING",
            GameState::Started => "STARTED",
            GameState::Ended => "ENDED",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == name)
    }
}

/// One player's authoritative position at a broadcast tick.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PlayerState {
    pub id: ClientId,
    pub x: i32,
    pub y: i32,
}

impl PlayerState {
    pub fn new(id: ClientId, x: i32, y: i32) -> Self {
        Self { id, x, y }
    }
}

/// Every datagram exchanged with the authority decodes to exactly one of these.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Message {
    /// Connection request, client to server.
    Hello,
    /// Session id assignment, server to client.
    Welcome { id: ClientId },
    /// Keep-alive sent once per tick while the game has not started.
    Ping { id: ClientId },
    /// Position report sent once per tick after the game has started.
    ClientUpdate { id: ClientId, x: i32, y: i32 },
    /// World broadcast. `tick` is `None` only for text broadcasts that omit `TICK=`.
    StatePacket {
        state: GameState,
        tick: Option<Tick>,
        players: Vec<PlayerState>,
    },
    PlayerState(PlayerState),
}

impl Message {
    /// Short variant name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Hello => "hello",
            Message::Welcome { .. } => "welcome",
            Message::Ping { .. } => "ping",
            Message::ClientUpdate { .. } => "client_update",
            Message::StatePacket { .. } => "state_packet",
            Message::PlayerState(_) => "player_state",
        }
    }

    /// Tick carried by a broadcast whose state is `Started`.
    ///
    /// Ticks from waiting or ended broadcasts do not count towards loss.
    pub fn started_tick(&self) -> Option<Tick> {
        match self {
            Message::StatePacket {
                state: GameState::Started,
                tick,
                ..
            } => *tick,
            _ => None,
        }
    }

    pub fn is_game_started(&self) -> bool {
        matches!(
            self,
            Message::StatePacket {
                state: GameState::Started,
                ..
            }
        )
    }
}
