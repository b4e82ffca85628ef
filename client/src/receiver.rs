//! Receiving half of a simulated client.

use crate::channel::Channel;
use crate::tick_tracker::TickTracker;
use log::{debug, warn};
use shared::{Message, WireFormat, RECV_BUFFER_SIZE};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Everything the receive loop learned, handed back when it is joined.
///
/// The loop is the only writer of the tick tracker, so ownership moves to the
/// caller on completion instead of being shared behind a lock.
#[derive(Debug, Default, Clone)]
pub struct ReceiveStats {
    pub tracker: TickTracker,
    /// Total size of decoded state broadcasts.
    pub snapshot_bytes: u64,
    pub snapshots: u64,
    pub dropped: u64,
}

impl ReceiveStats {
    /// Mean broadcast size in bytes, 0 when none arrived.
    pub fn avg_packet_size(&self) -> f64 {
        if self.snapshots == 0 {
            0.0
        } else {
            self.snapshot_bytes as f64 / self.snapshots as f64
        }
    }

    /// Feeds one datagram through the codec. Anything that is not a state
    /// broadcast is dropped without affecting the session.
    pub fn absorb(&mut self, data: &[u8], format: WireFormat, game_started: &AtomicBool) {
        let msg = match format.decode(data) {
            Ok(msg) => msg,
            Err(e) => {
                self.dropped += 1;
                debug!("Dropping undecodable datagram ({} bytes): {}", data.len(), e);
                return;
            }
        };

        if !matches!(msg, Message::StatePacket { .. }) {
            self.dropped += 1;
            debug!("Ignoring unexpected {} message", msg.kind());
            return;
        }

        self.snapshot_bytes += data.len() as u64;
        self.snapshots += 1;

        if msg.is_game_started() {
            game_started.store(true, Ordering::Release);
        }
        if let Some(tick) = msg.started_tick() {
            self.tracker.observe(tick);
        }
    }
}

/// Drains the session socket until `deadline`.
///
/// Each wait is capped by `poll` so the deadline is noticed promptly even
/// when the authority has gone quiet.
pub async fn run_receive_loop(
    channel: Channel,
    game_started: Arc<AtomicBool>,
    deadline: Instant,
    poll: Duration,
) -> ReceiveStats {
    let mut stats = ReceiveStats::default();
    let mut buffer = vec![0u8; RECV_BUFFER_SIZE];

    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let wait = poll.min(deadline - now);

        match channel.recv(&mut buffer, wait).await {
            Ok(Some(len)) => stats.absorb(&buffer[..len], channel.format(), &game_started),
            Ok(None) => continue,
            Err(e) => {
                warn!("Error receiving packet: {}", e);
                sleep(Duration::from_millis(10).min(wait)).await;
            }
        }
    }

    debug!(
        "Receive loop finished: {} snapshots, {} dropped",
        stats.snapshots, stats.dropped
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{GameState, PlayerState};

    fn broadcast(format: WireFormat, state: GameState, tick: u32) -> Vec<u8> {
        format
            .encode(&Message::StatePacket {
                state,
                tick: Some(tick),
                players: vec![PlayerState::new(1, 5, 5)],
            })
            .unwrap()
    }

    #[test]
    fn test_started_broadcast_sets_flag_and_tick() {
        let started = AtomicBool::new(false);
        let mut stats = ReceiveStats::default();

        stats.absorb(
            &broadcast(WireFormat::Binary, GameState::Started, 3),
            WireFormat::Binary,
            &started,
        );

        assert!(started.load(Ordering::Acquire));
        assert_eq!(stats.tracker.first_tick(), Some(3));
        assert_eq!(stats.snapshots, 1);
    }

    #[test]
    fn test_waiting_broadcast_counts_size_but_not_tick() {
        let started = AtomicBool::new(false);
        let mut stats = ReceiveStats::default();
        let data = broadcast(WireFormat::Text, GameState::Waiting, 3);

        stats.absorb(&data, WireFormat::Text, &started);

        assert!(!started.load(Ordering::Acquire));
        assert_eq!(stats.tracker.received(), 0);
        assert_eq!(stats.avg_packet_size(), data.len() as f64);
    }

    #[test]
    fn test_garbage_and_foreign_messages_are_dropped() {
        let started = AtomicBool::new(false);
        let mut stats = ReceiveStats::default();

        stats.absorb(b"\xff\x00garbage", WireFormat::Binary, &started);
        stats.absorb(b"WELCOME:3", WireFormat::Text, &started);
        stats.absorb(b"UPDATE:x:1:1", WireFormat::Text, &started);

        assert_eq!(stats.dropped, 3);
        assert_eq!(stats.snapshots, 0);
        assert_eq!(stats.avg_packet_size(), 0.0);
        assert!(!started.load(Ordering::Acquire));
    }

    #[test]
    fn test_text_broadcast_without_tick_still_starts_game() {
        let started = AtomicBool::new(false);
        let mut stats = ReceiveStats::default();

        stats.absorb(b"lobby GAME:STARTED", WireFormat::Text, &started);

        assert!(started.load(Ordering::Acquire));
        assert_eq!(stats.tracker.received(), 0);
    }

    #[test]
    fn test_extra_player_fields_still_start_game() {
        let started = AtomicBool::new(false);
        let mut stats = ReceiveStats::default();

        stats.absorb(
            b"GAME:STARTED|TICK=7|STATE:1:10:20:team_red",
            WireFormat::Text,
            &started,
        );

        assert!(started.load(Ordering::Acquire));
        assert_eq!(stats.tracker.first_tick(), Some(7));
        assert_eq!(stats.snapshots, 1);
        assert_eq!(stats.dropped, 0);
    }

    #[tokio::test]
    async fn test_loop_collects_ticks_until_deadline() {
        let server = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let channel = Channel::bind(server.local_addr().unwrap(), WireFormat::Text)
            .await
            .unwrap();
        let client_addr = channel.local_addr().unwrap();

        let started = Arc::new(AtomicBool::new(false));
        let deadline = Instant::now() + Duration::from_millis(400);
        let handle = tokio::spawn(run_receive_loop(
            channel,
            Arc::clone(&started),
            deadline,
            Duration::from_millis(50),
        ));

        for tick in [5, 6, 6, 8] {
            let data = broadcast(WireFormat::Text, GameState::Started, tick);
            server.send_to(&data, client_addr).await.unwrap();
        }
        server.send_to(b"noise", client_addr).await.unwrap();

        let stats = handle.await.unwrap();
        assert!(Instant::now() >= deadline);
        assert!(started.load(Ordering::Acquire));

        let report = stats.tracker.compute_loss();
        assert_eq!(report.expected, 4);
        assert_eq!(report.received, 3);
        assert_eq!(stats.dropped, 1);
    }
}
