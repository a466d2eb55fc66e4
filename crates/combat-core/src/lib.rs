//! Combat decision core: attack selection and tactical cover seeking.
//!
//! The crate drives the two decision subsystems of an autonomous combat
//! agent: a policy engine that picks the next attack from a catalog under
//! cooldown and condition constraints, and a cover subsystem that searches,
//! scores, and claims defensive positions while running a timed hide/peek
//! state machine.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

use combat_events::SimTime;

pub mod components;
pub mod config;
pub mod events;
pub mod setup;
pub mod systems;

pub use components::*;
pub use config::Config;
pub use events::TickEvents;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct CombatRng(pub SmallRng);

/// Simulation clock resource: current time and fixed tick length.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Clock {
    pub time: SimTime,
    /// Seconds advanced per scheduler tick
    pub dt: f32,
}

impl Clock {
    pub fn new(dt: f32) -> Self {
        Self {
            time: SimTime::default(),
            dt,
        }
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f32 {
        self.time.seconds
    }

    pub fn advance(&mut self) {
        self.time.advance(self.dt);
    }
}
