//! Condition Evaluation
//!
//! Stateless predicates over a snapshot of the agent and its perception.
//! These gate conditional abilities and drive priority interrupts.

use glam::Vec2;

use crate::components::attack::{AbilityCondition, ConditionalAbility};
use crate::systems::perception::VisibleContacts;

/// Read-only snapshot of everything the predicates may inspect.
#[derive(Debug, Clone, Copy)]
pub struct ConditionSnapshot<'a> {
    pub position: Vec2,
    pub health_ratio: f32,
    pub active_summons: u32,
    pub contacts: &'a VisibleContacts,
}

/// Evaluate a condition gate against the current snapshot.
pub fn condition_holds(gate: &ConditionalAbility, snap: &ConditionSnapshot) -> bool {
    match gate.condition {
        AbilityCondition::SelfLowHealth => snap.health_ratio <= gate.threshold,
        AbilityCondition::AllyLowHealth => snap
            .contacts
            .allies
            .iter()
            .any(|ally| ally.health_ratio <= gate.threshold),
        AbilityCondition::NoActiveSummons => snap.active_summons == 0,
        AbilityCondition::DistanceFromTarget => snap
            .contacts
            .nearest_hostile(snap.position)
            .map(|target| {
                let distance = snap.position.distance(target.position);
                gate.comparison.compare(distance, gate.threshold)
            })
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::attack::Comparison;
    use crate::systems::perception::Contact;
    use bevy_ecs::entity::Entity;

    fn gate(condition: AbilityCondition, comparison: Comparison, threshold: f32) -> ConditionalAbility {
        ConditionalAbility {
            condition,
            comparison,
            threshold,
            high_priority: false,
        }
    }

    fn contact(id: &str, position: Vec2, health_ratio: f32) -> Contact {
        Contact {
            entity: Entity::from_raw(0),
            id: id.to_string(),
            position,
            forward: Vec2::X,
            health_ratio,
        }
    }

    #[test]
    fn test_self_low_health() {
        let contacts = VisibleContacts::new();
        let mut snap = ConditionSnapshot {
            position: Vec2::ZERO,
            health_ratio: 0.2,
            active_summons: 0,
            contacts: &contacts,
        };
        let g = gate(AbilityCondition::SelfLowHealth, Comparison::LessThan, 0.3);
        assert!(condition_holds(&g, &snap));
        snap.health_ratio = 0.8;
        assert!(!condition_holds(&g, &snap));
    }

    #[test]
    fn test_ally_low_health_requires_a_wounded_ally() {
        let mut contacts = VisibleContacts::new();
        contacts.allies.push(contact("a1", Vec2::X, 0.9));
        let snap = ConditionSnapshot {
            position: Vec2::ZERO,
            health_ratio: 1.0,
            active_summons: 0,
            contacts: &contacts,
        };
        let g = gate(AbilityCondition::AllyLowHealth, Comparison::LessThan, 0.3);
        assert!(!condition_holds(&g, &snap));

        contacts.allies.push(contact("a2", Vec2::Y, 0.25));
        let snap = ConditionSnapshot {
            position: Vec2::ZERO,
            health_ratio: 1.0,
            active_summons: 0,
            contacts: &contacts,
        };
        assert!(condition_holds(&g, &snap));
    }

    #[test]
    fn test_no_active_summons() {
        let contacts = VisibleContacts::new();
        let mut snap = ConditionSnapshot {
            position: Vec2::ZERO,
            health_ratio: 1.0,
            active_summons: 0,
            contacts: &contacts,
        };
        let g = gate(AbilityCondition::NoActiveSummons, Comparison::LessThan, 0.0);
        assert!(condition_holds(&g, &snap));
        snap.active_summons = 2;
        assert!(!condition_holds(&g, &snap));
    }

    #[test]
    fn test_distance_from_target_both_directions() {
        let mut contacts = VisibleContacts::new();
        contacts
            .hostiles
            .push(contact("r1", Vec2::new(5.0, 0.0), 1.0));
        let snap = ConditionSnapshot {
            position: Vec2::ZERO,
            health_ratio: 1.0,
            active_summons: 0,
            contacts: &contacts,
        };
        let near = gate(AbilityCondition::DistanceFromTarget, Comparison::LessThan, 6.0);
        let far = gate(AbilityCondition::DistanceFromTarget, Comparison::GreaterThan, 6.0);
        assert!(condition_holds(&near, &snap));
        assert!(!condition_holds(&far, &snap));
    }

    #[test]
    fn test_distance_without_target_is_false() {
        let contacts = VisibleContacts::new();
        let snap = ConditionSnapshot {
            position: Vec2::ZERO,
            health_ratio: 1.0,
            active_summons: 0,
            contacts: &contacts,
        };
        let g = gate(AbilityCondition::DistanceFromTarget, Comparison::LessThan, 100.0);
        assert!(!condition_holds(&g, &snap));
    }
}
