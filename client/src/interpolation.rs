//! Render-rate smoothing of tick-rate snapshots.
//!
//! Every snapshot re-anchors each entity: the position currently on screen
//! becomes the start, the reported position becomes the target and the blend
//! factor restarts at zero. Each rendered frame then moves the blend factor
//! forward by a fixed step. Entities missing from a snapshot are evicted.

use shared::message::ClientId;
use shared::PlayerState;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderPosition {
    pub x: f32,
    pub y: f32,
}

impl RenderPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn lerp(self, target: RenderPosition, t: f32) -> RenderPosition {
        RenderPosition {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }
}

impl From<&PlayerState> for RenderPosition {
    fn from(player: &PlayerState) -> Self {
        RenderPosition::new(player.x as f32, player.y as f32)
    }
}

/// Smoothing state of one remote entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationState {
    previous: RenderPosition,
    target: RenderPosition,
    blend: f32,
}

impl InterpolationState {
    fn new(position: RenderPosition) -> Self {
        Self {
            previous: position,
            target: position,
            blend: 0.0,
        }
    }

    pub fn previous(&self) -> RenderPosition {
        self.previous
    }

    pub fn target(&self) -> RenderPosition {
        self.target
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }

    /// Position for the current blend factor. Exactly the target once the
    /// blend reaches 1.
    pub fn position(&self) -> RenderPosition {
        if self.blend >= 1.0 {
            self.target
        } else {
            self.previous.lerp(self.target, self.blend)
        }
    }

    fn retarget(&mut self, target: RenderPosition) {
        self.previous = self.position();
        self.target = target;
        self.blend = 0.0;
    }

    fn advance(&mut self, step: f32) -> RenderPosition {
        // NaN and negative steps leave the blend where it is.
        self.blend = (self.blend + step.max(0.0)).min(1.0);
        self.position()
    }
}

/// Arena of per-entity smoothing state keyed by entity id.
#[derive(Debug, Default)]
pub struct Interpolator {
    entities: HashMap<ClientId, InterpolationState>,
    max_x_seen: i32,
    max_y_seen: i32,
}

impl Interpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a snapshot with full-replace semantics: listed entities are
    /// created or re-anchored, everything else is evicted.
    pub fn on_snapshot(&mut self, players: &[PlayerState]) {
        let mut next: HashMap<ClientId, InterpolationState> = HashMap::with_capacity(players.len());

        for player in players {
            let target = RenderPosition::from(player);
            let state = match self.entities.remove(&player.id) {
                Some(mut state) => {
                    state.retarget(target);
                    state
                }
                None => match next.remove(&player.id) {
                    // Same id twice in one snapshot: the later entry wins.
                    Some(mut state) => {
                        state.retarget(target);
                        state
                    }
                    None => InterpolationState::new(target),
                },
            };
            next.insert(player.id, state);

            self.max_x_seen = self.max_x_seen.max(player.x);
            self.max_y_seen = self.max_y_seen.max(player.y);
        }

        self.entities = next;
    }

    /// Moves every entity one render frame forward.
    pub fn advance(&mut self, step: f32) -> HashMap<ClientId, RenderPosition> {
        self.entities
            .iter_mut()
            .map(|(id, state)| (*id, state.advance(step)))
            .collect()
    }

    pub fn get(&self, id: ClientId) -> Option<&InterpolationState> {
        self.entities.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Largest coordinates reported so far, at least 1 on each axis.
    pub fn bounds(&self) -> (i32, i32) {
        (self.max_x_seen.max(1), self.max_y_seen.max(1))
    }
}
