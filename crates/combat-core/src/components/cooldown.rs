//! Cooldown Tracking
//!
//! Per-agent timestamp bookkeeping for attack option cooldowns. Timestamps
//! are agent-local and never shared across agents.

use bevy_ecs::prelude::*;

/// Component tracking the last-used time of each attack option, indexed by
/// the option's position in the agent's catalog.
#[derive(Component, Debug, Clone, Default)]
pub struct CooldownTracker {
    last_used: Vec<Option<f32>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_slot(&mut self, slot: usize) {
        if self.last_used.len() <= slot {
            self.last_used.resize(slot + 1, None);
        }
    }

    /// Last-used timestamp for a slot, or None if never used.
    pub fn last_used(&self, slot: usize) -> Option<f32> {
        self.last_used.get(slot).copied().flatten()
    }

    /// Record a use at `now`. Timestamps are monotonically non-decreasing;
    /// an earlier time than the recorded one is ignored.
    pub fn mark_used(&mut self, slot: usize, now: f32) {
        self.ensure_slot(slot);
        match self.last_used[slot] {
            Some(prev) if prev > now => {}
            _ => self.last_used[slot] = Some(now),
        }
    }

    /// Reset a slot's cooldown baseline to `now` regardless of prior state.
    /// Used when a condition interrupt fires.
    pub fn reset_baseline(&mut self, slot: usize, now: f32) {
        self.ensure_slot(slot);
        self.last_used[slot] = Some(now);
    }

    /// An option is ready iff it was never used or its cooldown has elapsed.
    pub fn is_ready(&self, slot: usize, cooldown_seconds: f32, now: f32) -> bool {
        match self.last_used(slot) {
            None => true,
            Some(t0) => now >= t0 + cooldown_seconds,
        }
    }

    pub fn clear(&mut self) {
        self.last_used.clear();
    }
}
