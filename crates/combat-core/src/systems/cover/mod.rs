//! Cover subsystem: node index, selection filter chain, and the per-agent
//! state machine.

pub mod index;
pub mod select;
pub mod task;

pub use index::{CoverNodeIndex, NodeId};
pub use select::{find_cover_node, CoverSearch};
pub use task::{drive_cover_tasks, CoverContext, CoverState, CoverTask};
