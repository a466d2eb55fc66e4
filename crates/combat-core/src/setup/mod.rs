//! World Setup
//!
//! Faction creation, cover node placement, and agent spawning for the
//! skirmish arena.

pub mod agents;
pub mod arena;

pub use agents::*;
pub use arena::*;
