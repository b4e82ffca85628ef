//! Wire codecs for [`Message`].
//!
//! Two self-contained implementations share one signature. Neither can read
//! what the other writes, so the format is fixed per deployment via
//! [`WireFormat`].

pub mod binary;
pub mod text;

use crate::{DecodeError, EncodeError, Message};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    #[default]
    Text,
    Binary,
}

impl WireFormat {
    pub fn encode(self, msg: &Message) -> Result<Vec<u8>, EncodeError> {
        match self {
            WireFormat::Text => Ok(text::encode(msg).into_bytes()),
            WireFormat::Binary => binary::encode(msg),
        }
    }

    pub fn decode(self, data: &[u8]) -> Result<Message, DecodeError> {
        match self {
            WireFormat::Text => text::decode(data),
            WireFormat::Binary => binary::decode(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameState, PlayerState};

    fn samples() -> Vec<Message> {
        vec![
            Message::Hello,
            Message::Welcome { id: 1 },
            Message::Ping { id: 42 },
            Message::ClientUpdate {
                id: 7,
                x: 1500,
                y: 0,
            },
            Message::PlayerState(PlayerState::new(9, 3, 4)),
            Message::StatePacket {
                state: GameState::Started,
                tick: Some(1234),
                players: vec![PlayerState::new(1, 10, 20), PlayerState::new(2, 30, 40)],
            },
            Message::StatePacket {
                state: GameState::Waiting,
                tick: Some(0),
                players: vec![],
            },
        ]
    }

    #[test]
    fn test_both_formats_are_self_consistent() {
        for format in [WireFormat::Text, WireFormat::Binary] {
            for msg in samples() {
                let bytes = format.encode(&msg).unwrap();
                assert_eq!(format.decode(&bytes).unwrap(), msg, "{:?} {:?}", format, msg);
            }
        }
    }

    #[test]
    fn test_formats_do_not_interoperate() {
        let msg = Message::Ping { id: 5 };
        let binary = WireFormat::Binary.encode(&msg).unwrap();
        assert_ne!(WireFormat::Text.decode(&binary).ok(), Some(msg.clone()));

        let text = WireFormat::Text.encode(&msg).unwrap();
        assert!(WireFormat::Binary.decode(&text).is_err());
    }
}
