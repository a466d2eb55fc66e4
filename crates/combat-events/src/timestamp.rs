//! Simulation Timestamp
//!
//! Combat time is tracked both as a discrete tick count and as accumulated
//! seconds, since cooldowns and cover phase timers are specified in seconds
//! while the scheduler advances in fixed ticks.
//!
//! # Example
//!
//! ```
//! use combat_events::SimTime;
//!
//! let t = SimTime::new(30, 3.0);
//! assert_eq!(t.tick, 30);
//! assert!((t.seconds - 3.0).abs() < f32::EPSILON);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Scheduler tick on which the event occurred
    pub tick: u64,
    /// Accumulated simulation seconds at that tick
    pub seconds: f32,
}

impl SimTime {
    pub fn new(tick: u64, seconds: f32) -> Self {
        Self { tick, seconds }
    }

    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.seconds += dt;
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick_{}@{:.2}s", self.tick, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut t = SimTime::default();
        t.advance(0.1);
        t.advance(0.1);
        assert_eq!(t.tick, 2);
        assert!((t.seconds - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_display() {
        let t = SimTime::new(5, 0.5);
        assert_eq!(t.to_string(), "tick_5@0.50s");
    }

    #[test]
    fn test_serde_round_trip() {
        let t = SimTime::new(12, 1.2);
        let json = serde_json::to_string(&t).unwrap();
        let back: SimTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
