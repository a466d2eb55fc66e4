//! Attack Systems
//!
//! Condition predicates, the attack-selection policy engine, and the
//! minimal execution loop that applies selected attacks in the demo.

pub mod conditions;
pub mod execute;
pub mod select;

pub use conditions::{condition_holds, ConditionSnapshot};
pub use execute::{apply_damage, execute_attacks, PendingDamage};
pub use select::{condition_interrupts, select_attack, select_attacks, SelectionOutcome};
