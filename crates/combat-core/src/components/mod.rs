//! ECS Components
//!
//! All entity components for agents, factions, attacks, cooldowns, and cover.

pub mod agent;
pub mod attack;
pub mod cooldown;
pub mod cover;
pub mod faction;

pub use agent::*;
pub use attack::*;
pub use cooldown::*;
pub use cover::*;
pub use faction::*;
