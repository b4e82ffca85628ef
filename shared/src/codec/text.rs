//! Colon-delimited text encoding.
//!
//! Client messages follow a strict grammar (`PING:<id>`, `UPDATE:<id>:<x>:<y>`).
//! Server broadcasts are scanned loosely: a payload is a broadcast as soon as
//! it contains `GAME:<STATE>`, and `TICK=<digits>` / `STATE:<players>` are picked
//! up wherever they appear, so servers may add fields freely.

use crate::message::{ClientId, Tick};
use crate::{DecodeError, GameState, Message, PlayerState};

const GAME_MARKER: &str = "GAME:";
const TICK_MARKER: &str = "TICK=";
const PLAYERS_MARKER: &str = "STATE:";

pub fn encode(msg: &Message) -> String {
    match msg {
        Message::Hello => "HELLO".to_string(),
        Message::Welcome { id } => format!("WELCOME:{}", id),
        Message::Ping { id } => format!("PING:{}", id),
        Message::ClientUpdate { id, x, y } => format!("UPDATE:{}:{}:{}", id, x, y),
        Message::PlayerState(p) => format!("PLAYER:{}:{}:{}", p.id, p.x, p.y),
        Message::StatePacket {
            state,
            tick,
            players,
        } => {
            let mut out = format!("{}{}", GAME_MARKER, state.as_str());
            if let Some(tick) = tick {
                out.push_str(&format!("|{}{}", TICK_MARKER, tick));
            }
            let entries: Vec<String> = players
                .iter()
                .map(|p| format!("{}:{}:{}", p.id, p.x, p.y))
                .collect();
            out.push_str(&format!("|{}{}", PLAYERS_MARKER, entries.join(",")));
            out
        }
    }
}

pub fn decode(data: &[u8]) -> Result<Message, DecodeError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| DecodeError::MalformedPacket(format!("not utf-8: {}", e)))?;
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());

    if text == "HELLO" {
        return Ok(Message::Hello);
    }
    if let Some(rest) = text.strip_prefix("WELCOME:") {
        let mut fields = Fields::new(rest);
        let id = fields.id()?;
        fields.finish()?;
        return Ok(Message::Welcome { id });
    }
    if let Some(rest) = text.strip_prefix("PING:") {
        let mut fields = Fields::new(rest);
        let id = fields.id()?;
        fields.finish()?;
        return Ok(Message::Ping { id });
    }
    if let Some(rest) = text.strip_prefix("UPDATE:") {
        let (id, x, y) = position_triple(rest)?;
        return Ok(Message::ClientUpdate { id, x, y });
    }
    if let Some(rest) = text.strip_prefix("PLAYER:") {
        let (id, x, y) = position_triple(rest)?;
        return Ok(Message::PlayerState(PlayerState { id, x, y }));
    }
    if text.contains(GAME_MARKER) {
        return decode_broadcast(text);
    }

    let kind = text.split(':').next().unwrap_or_default();
    Err(DecodeError::UnknownMessageType(kind.chars().take(32).collect()))
}

fn decode_broadcast(text: &str) -> Result<Message, DecodeError> {
    let state_name = marker_value(text, GAME_MARKER, |c| c.is_ascii_uppercase() || c == '_')
        .unwrap_or_default();
    let state = GameState::from_name(state_name)
        .ok_or_else(|| DecodeError::field("state", state_name))?;

    let tick = scan_tick(text)?;

    // Player entries never decide whether a broadcast is accepted.
    let players = marker_value(text, PLAYERS_MARKER, |c| !c.is_whitespace())
        .map(|list| list.split([',', '|']).filter_map(player_entry).collect())
        .unwrap_or_default();

    Ok(Message::StatePacket {
        state,
        tick,
        players,
    })
}

/// First `TICK=<digits>` occurrence. A marker without digits does not count.
fn scan_tick(text: &str) -> Result<Option<Tick>, DecodeError> {
    for (start, _) in text.match_indices(TICK_MARKER) {
        let rest = &text[start + TICK_MARKER.len()..];
        let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if end > 0 {
            let digits = &rest[..end];
            return digits
                .parse::<Tick>()
                .map(Some)
                .map_err(|_| DecodeError::field("tick", digits));
        }
    }
    Ok(None)
}

/// The run of characters accepted by `keep` right after the first `marker`.
fn marker_value<'a>(text: &'a str, marker: &str, keep: impl Fn(char) -> bool) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find(|c: char| !keep(c)).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// `id:x:y`, ignoring any further per-player fields.
fn player_entry(entry: &str) -> Option<PlayerState> {
    let mut fields = Fields::new(entry);
    let id = fields.id().ok()?;
    let x = fields.coord("x").ok()?;
    let y = fields.coord("y").ok()?;
    Some(PlayerState { id, x, y })
}

fn position_triple(rest: &str) -> Result<(ClientId, i32, i32), DecodeError> {
    let mut fields = Fields::new(rest);
    let id = fields.id()?;
    let x = fields.coord("x")?;
    let y = fields.coord("y")?;
    fields.finish()?;
    Ok((id, x, y))
}

struct Fields<'a> {
    parts: std::str::Split<'a, char>,
}

impl<'a> Fields<'a> {
    fn new(rest: &'a str) -> Self {
        Self {
            parts: rest.split(':'),
        }
    }

    fn next(&mut self) -> &'a str {
        self.parts.next().unwrap_or_default()
    }

    /// Ids are unsigned, so `-1` fails here rather than producing a bogus session.
    fn id(&mut self) -> Result<ClientId, DecodeError> {
        let raw = self.next();
        raw.parse().map_err(|_| DecodeError::field("id", raw))
    }

    fn coord(&mut self, field: &'static str) -> Result<i32, DecodeError> {
        let raw = self.next();
        raw.parse().map_err(|_| DecodeError::field(field, raw))
    }

    fn finish(mut self) -> Result<(), DecodeError> {
        match self.parts.next() {
            None => Ok(()),
            Some(extra) => Err(DecodeError::field("trailing", extra)),
        }
    }
}
