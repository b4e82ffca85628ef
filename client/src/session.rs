//! Sending half of a simulated client: movement and the fixed-cadence loop.

use crate::channel::Channel;
use crate::config::Movement;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared::message::ClientId;
use shared::{Message, WALK_STEPS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};

/// Position generator for one client.
#[derive(Debug)]
pub struct Walker {
    x: i32,
    y: i32,
    movement: Movement,
    rng: StdRng,
}

impl Walker {
    pub fn new(movement: Movement, mut rng: StdRng) -> Self {
        let (x, y) = match movement {
            Movement::Linear => (0, 0),
            Movement::RandomWalk { bound } => {
                let bound = bound.max(0);
                (rng.gen_range(0..=bound), rng.gen_range(0..=bound))
            }
        };
        Self { x, y, movement, rng }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn advance(&mut self) {
        match self.movement {
            Movement::Linear => {
                self.x = self.x.saturating_add(1);
                self.y = self.y.saturating_add(1);
            }
            Movement::RandomWalk { bound } => {
                let bound = bound.max(0);
                let dx = *WALK_STEPS.choose(&mut self.rng).unwrap_or(&0);
                let dy = *WALK_STEPS.choose(&mut self.rng).unwrap_or(&0);
                self.x = (self.x + dx).clamp(0, bound);
                self.y = (self.y + dy).clamp(0, bound);
            }
        }
    }
}

/// What the simulation loop reports once its deadline has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationStats {
    pub updates_sent: u64,
    pub pings_sent: u64,
    pub send_failures: u64,
    pub final_position: (i32, i32),
}

/// Per-client state owned by the simulation loop.
///
/// `game_started` is the only value shared with the receive loop. It is only
/// ever set, so a race can delay the switch from pings to updates by one tick
/// but never undo it.
#[derive(Debug)]
pub struct ClientSession {
    id: ClientId,
    walker: Walker,
    game_started: Arc<AtomicBool>,
    updates_sent: u64,
    pings_sent: u64,
}

impl ClientSession {
    pub fn new(id: ClientId, movement: Movement, game_started: Arc<AtomicBool>) -> Self {
        Self::with_rng(id, movement, game_started, StdRng::from_entropy())
    }

    pub fn with_rng(
        id: ClientId,
        movement: Movement,
        game_started: Arc<AtomicBool>,
        rng: StdRng,
    ) -> Self {
        Self {
            id,
            walker: Walker::new(movement, rng),
            game_started,
            updates_sent: 0,
            pings_sent: 0,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn position(&self) -> (i32, i32) {
        self.walker.position()
    }

    pub fn updates_sent(&self) -> u64 {
        self.updates_sent
    }

    /// Message for the current tick. An update reports the current position,
    /// then moves the walker for the next tick.
    pub fn next_message(&mut self) -> Message {
        if !self.game_started.load(Ordering::Acquire) {
            self.pings_sent += 1;
            return Message::Ping { id: self.id };
        }

        let (x, y) = self.walker.position();
        self.walker.advance();
        self.updates_sent += 1;
        Message::ClientUpdate { id: self.id, x, y }
    }

    /// Sends one message per `every` until `deadline`, whatever the network does.
    pub async fn run(mut self, channel: Channel, every: Duration, deadline: Instant) -> SimulationStats {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut send_failures = 0;

        loop {
            tokio::select! {
                biased;

                _ = sleep_until(deadline) => break,

                _ = ticker.tick() => {
                    if Instant::now() >= deadline {
                        break;
                    }
                    let msg = self.next_message();
                    if let Err(e) = channel.send(&msg).await {
                        send_failures += 1;
                        warn!("Client {} failed to send {}: {}", self.id, msg.kind(), e);
                    }
                }
            }
        }

        debug!(
            "Client {} simulation finished: {} updates, {} pings",
            self.id, self.updates_sent, self.pings_sent
        );

        SimulationStats {
            updates_sent: self.updates_sent,
            pings_sent: self.pings_sent,
            send_failures,
            final_position: self.walker.position(),
        }
    }
}
