//! Shared event types and serialization for the combat decision core.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod event;
pub mod timestamp;

// Re-export timestamp types
pub use timestamp::SimTime;

// Re-export event types
pub use event::*;
