//! Combat Lifecycle
//!
//! Enters and leaves combat based on perception, and retires dead agents
//! without leaving cover occupancy or movement flags dangling.

use bevy_ecs::prelude::*;
use tracing::info;

use combat_events::{EventPayload, EventType};

use crate::components::agent::{AgentId, Alive, Health, PoseFlags};
use crate::components::attack::CombatState;
use crate::events::TickEvents;
use crate::systems::cover::{CoverNodeIndex, CoverTask};
use crate::systems::movement::Navigator;
use crate::systems::perception::VisibleContacts;
use crate::Clock;

/// System to toggle the in-combat flag from current perception.
pub fn update_combat_status(
    mut query: Query<(&Alive, &VisibleContacts, &mut CombatState)>,
) {
    for (alive, contacts, mut combat) in query.iter_mut() {
        if !alive.is_alive() {
            continue;
        }
        let engaged = contacts.has_hostiles();
        if engaged && !combat.in_combat {
            combat.in_combat = true;
        } else if !engaged && combat.in_combat {
            // Cover teardown happens in the cover task's own advance
            combat.reset();
        }
    }
}

/// System to retire agents whose health reached zero.
#[allow(clippy::type_complexity)]
pub fn handle_deaths(
    clock: Res<Clock>,
    mut nodes: ResMut<CoverNodeIndex>,
    mut events: ResMut<TickEvents>,
    mut query: Query<(
        Entity,
        &AgentId,
        &Health,
        &mut Alive,
        &mut CombatState,
        &mut Navigator,
        &mut PoseFlags,
        &mut VisibleContacts,
        &mut CoverTask,
    )>,
) {
    for (entity, agent_id, health, mut alive, mut combat, mut navigator, mut pose, mut contacts, mut task) in
        query.iter_mut()
    {
        if !alive.is_alive() || !health.is_depleted() {
            continue;
        }
        alive.0 = false;
        combat.reset();
        task.cancel(
            entity,
            &agent_id.0,
            &mut navigator,
            &mut pose,
            &mut contacts,
            &mut nodes,
            &mut events,
            clock.time,
        );
        navigator.cancel();
        info!(agent = agent_id.0, "agent died");
        events.emit(
            clock.time,
            EventType::Death,
            agent_id.0.clone(),
            EventPayload::None {},
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::{Combatant, Facing, Position};
    use crate::components::cover::{CoverKind, CoverNode};
    use crate::systems::perception::Contact;
    use glam::Vec2;

    #[test]
    fn test_entering_and_leaving_combat() {
        let mut world = World::new();
        let mut contacts = VisibleContacts::new();
        contacts.hostiles.push(Contact {
            entity: Entity::from_raw(9),
            id: "r1".to_string(),
            position: Vec2::X,
            forward: Vec2::X,
            health_ratio: 1.0,
        });
        let agent = world
            .spawn((Combatant, Alive::new(), contacts, CombatState::default()))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(update_combat_status);
        schedule.run(&mut world);
        assert!(world.get::<CombatState>(agent).unwrap().in_combat);

        world
            .get_mut::<VisibleContacts>(agent)
            .unwrap()
            .hostiles
            .clear();
        schedule.run(&mut world);
        let combat = world.get::<CombatState>(agent).unwrap();
        assert!(!combat.in_combat);
        assert!(combat.current_attack.is_none());
    }

    #[test]
    fn test_death_releases_cover_occupancy() {
        let mut world = World::new();
        world.insert_resource(Clock::new(0.1));
        world.insert_resource(TickEvents::new());

        let mut nodes = CoverNodeIndex::new();
        let node = nodes.add(CoverNode::new(Vec2::new(2.0, 0.0), Vec2::X, CoverKind::Stand));

        let agent = world
            .spawn((
                Combatant,
                AgentId("w1".to_string()),
                Health {
                    current: 0.0,
                    max: 30.0,
                },
                Alive::new(),
                Position(Vec2::ZERO),
                Facing(Vec2::X),
                CombatState {
                    in_combat: true,
                    current_attack: None,
                    last_swing: 0.0,
                },
                Navigator::new(4.0, 1.5),
                PoseFlags::default(),
                VisibleContacts::new(),
                CoverTask::holding_node(node),
            ))
            .id();
        assert!(nodes.try_claim(node, agent));
        world.insert_resource(nodes);

        let mut schedule = Schedule::default();
        schedule.add_systems(handle_deaths);
        schedule.run(&mut world);

        assert!(!world.get::<Alive>(agent).unwrap().is_alive());
        assert_eq!(world.resource::<CoverNodeIndex>().occupant(node), None);
        assert_eq!(
            world.resource::<TickEvents>().count_of(EventType::Death),
            1
        );
    }
}
