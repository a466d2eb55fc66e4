//! Agent Components
//!
//! Components for individual combatants: identity, vitals, spatial state.

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Marker component identifying an entity as a combatant
#[derive(Component, Debug, Clone, Default)]
pub struct Combatant;

/// Unique identifier for an agent
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

/// World position in 2D
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

/// Unit-length facing direction
#[derive(Component, Debug, Clone, Copy)]
pub struct Facing(pub Vec2);

impl Facing {
    /// Point toward `target` from `from`, keeping the old facing when the
    /// two positions coincide.
    pub fn look_at(&mut self, from: Vec2, target: Vec2) {
        let dir = (target - from).normalize_or_zero();
        if dir != Vec2::ZERO {
            self.0 = dir;
        }
    }
}

/// How far the agent can detect other agents
#[derive(Component, Debug, Clone, Copy)]
pub struct DetectionRadius(pub f32);

/// Hit points
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Fraction of health remaining, in [0, 1].
    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    pub fn apply_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Whether the agent is alive
#[derive(Component, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Alive(pub bool);

impl Alive {
    pub fn new() -> Self {
        Self(true)
    }

    pub fn is_alive(&self) -> bool {
        self.0
    }
}

/// Count of minions the agent currently has summoned
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ActiveSummons(pub u32);

/// Boolean pose toggles consumed by the presentation layer.
///
/// Fire-and-forget: nothing in the decision core reads animation state back.
#[derive(Component, Debug, Clone, Default)]
pub struct PoseFlags {
    /// Hide pose (crouched behind cover)
    pub hiding: bool,
}
