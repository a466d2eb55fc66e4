//! ECS Systems
//!
//! All decision-core systems: perception, movement, combat lifecycle,
//! attack selection and execution, and the cover subsystem.

pub mod attack;
pub mod cover;
pub mod lifecycle;
pub mod movement;
pub mod perception;

// Re-export commonly used systems
pub use attack::{
    apply_damage, condition_holds, condition_interrupts, execute_attacks, select_attack,
    select_attacks, ConditionSnapshot, PendingDamage, SelectionOutcome,
};
pub use cover::{
    drive_cover_tasks, find_cover_node, CoverContext, CoverNodeIndex, CoverSearch, CoverState,
    CoverTask, NodeId,
};
pub use lifecycle::{handle_deaths, update_combat_status};
pub use movement::{integrate_movement, Navigator};
pub use perception::{
    build_agent_directory, unobstructed_position, update_perception, AgentDirectory, Contact,
    VisibleContacts,
};
