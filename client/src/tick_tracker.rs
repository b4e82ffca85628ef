//! Per-session record of observed server ticks and the loss derived from it.

use shared::message::Tick;
use std::collections::HashSet;

/// Expected-versus-received tick accounting for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossReport {
    pub expected: u64,
    pub received: u64,
    /// Clamped into `[0, 100]`.
    pub loss_percent: f64,
}

impl LossReport {
    pub const EMPTY: LossReport = LossReport {
        expected: 0,
        received: 0,
        loss_percent: 0.0,
    };
}

/// Set of ticks seen by one session.
///
/// `first_tick` is the first tick that arrived; `last_tick` is the greatest
/// tick seen so far, so a reordered datagram never shrinks the window.
/// Duplicates are absorbed by the set.
#[derive(Debug, Default, Clone)]
pub struct TickTracker {
    ticks_seen: HashSet<Tick>,
    first_tick: Option<Tick>,
    last_tick: Option<Tick>,
}

impl TickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, tick: Tick) {
        self.ticks_seen.insert(tick);
        if self.first_tick.is_none() {
            self.first_tick = Some(tick);
        }
        self.last_tick = Some(self.last_tick.map_or(tick, |last| last.max(tick)));
    }

    pub fn first_tick(&self) -> Option<Tick> {
        self.first_tick
    }

    pub fn last_tick(&self) -> Option<Tick> {
        self.last_tick
    }

    pub fn received(&self) -> usize {
        self.ticks_seen.len()
    }

    pub fn compute_loss(&self) -> LossReport {
        let (first, last) = match (self.first_tick, self.last_tick) {
            (Some(first), Some(last)) => (first, last),
            _ => return LossReport::EMPTY,
        };

        // A tick older than `first` can arrive late; it still counts as
        // received, so `expected` never goes negative here.
        let expected = u64::from(last.saturating_sub(first)) + 1;
        let received = self.ticks_seen.len() as u64;
        let loss_percent = if expected > 0 {
            (100.0 * (expected as f64 - received as f64) / expected as f64).clamp(0.0, 100.0)
        } else {
            0.0
        };

        LossReport {
            expected,
            received,
            loss_percent,
        }
    }
}
