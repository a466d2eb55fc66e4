//! Movement Collaborator
//!
//! A thin stand-in for the navigation service: accepts a destination,
//! exposes remaining distance and a steering target, and supports
//! request/cancel. Pathfinding internals are out of scope; travel is
//! straight-line with a one-tick path computation delay.

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::agent::{Alive, Facing, Position};
use crate::Clock;

/// Per-agent navigation state.
#[derive(Component, Debug, Clone)]
pub struct Navigator {
    pub destination: Option<Vec2>,
    /// Distance at which movement stops short of the destination
    pub stopping_distance: f32,
    /// Stopping distance restored after cover or attack overrides end
    pub default_stopping_distance: f32,
    pub speed: f32,
    /// True for one tick after a request, while the path is "computed"
    pub path_pending: bool,
    /// Default movement paused (agent is holding a hide pose)
    pub paused: bool,
    /// Steering reorientation suppressed (agent is locked behind cover)
    pub turn_locked: bool,
}

impl Navigator {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            destination: None,
            stopping_distance,
            default_stopping_distance: stopping_distance,
            speed,
            path_pending: false,
            paused: false,
            turn_locked: false,
        }
    }

    /// Request a path to `destination`.
    pub fn request(&mut self, destination: Vec2) {
        self.destination = Some(destination);
        self.path_pending = true;
    }

    /// Cancel the current path, if any.
    pub fn cancel(&mut self) {
        self.destination = None;
        self.path_pending = false;
    }

    /// Restore the configured default stopping distance.
    pub fn restore_stopping_distance(&mut self) {
        self.stopping_distance = self.default_stopping_distance;
    }

    /// Distance left to the destination, or 0 when idle.
    pub fn remaining_distance(&self, from: Vec2) -> f32 {
        self.destination.map_or(0.0, |d| from.distance(d))
    }

    /// Direction toward the next steering point, if moving.
    pub fn steering_target(&self, from: Vec2) -> Option<Vec2> {
        let dest = self.destination?;
        let dir = (dest - from).normalize_or_zero();
        (dir != Vec2::ZERO).then_some(dir)
    }

    pub fn is_moving(&self) -> bool {
        self.destination.is_some() && !self.path_pending
    }
}

/// System to advance agents along their requested paths.
pub fn integrate_movement(
    clock: Res<Clock>,
    mut query: Query<(&mut Position, &mut Facing, &mut Navigator, &Alive)>,
) {
    let dt = clock.dt;
    for (mut position, mut facing, mut navigator, alive) in query.iter_mut() {
        if !alive.is_alive() || navigator.paused {
            continue;
        }
        if navigator.path_pending {
            // Path computed by next tick
            navigator.path_pending = false;
            continue;
        }
        let Some(dest) = navigator.destination else {
            continue;
        };
        let remaining = position.0.distance(dest);
        if remaining <= navigator.stopping_distance {
            continue;
        }
        let dir = (dest - position.0).normalize_or_zero();
        if dir == Vec2::ZERO {
            continue;
        }
        let step = (navigator.speed * dt).min(remaining - navigator.stopping_distance);
        position.0 += dir * step;
        if !navigator.turn_locked {
            facing.0 = dir;
        }
    }
}
