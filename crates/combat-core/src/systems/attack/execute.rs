//! Attack Execution System
//!
//! Minimal demo-loop execution: agents with a committed attack and an open
//! attack window swing at their nearest visible hostile. Damage is queued
//! and applied in a second pass so health borrows never overlap.

use bevy_ecs::prelude::*;

use combat_events::{AttackOutcome, EventPayload, EventType};

use crate::components::agent::{AgentId, Alive, Health, Position};
use crate::components::attack::CombatState;
use crate::config::Config;
use crate::events::TickEvents;
use crate::systems::cover::CoverTask;
use crate::systems::perception::VisibleContacts;
use crate::Clock;

/// Resource queueing damage to apply after the swing pass.
#[derive(Resource, Debug, Default)]
pub struct PendingDamage {
    hits: Vec<QueuedHit>,
}

#[derive(Debug, Clone)]
struct QueuedHit {
    attacker: String,
    target: Entity,
    damage: f32,
}

impl PendingDamage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// System to swing committed attacks at targets in range.
pub fn execute_attacks(
    clock: Res<Clock>,
    config: Res<Config>,
    mut pending: ResMut<PendingDamage>,
    mut query: Query<(
        &AgentId,
        &Alive,
        &Position,
        &VisibleContacts,
        &CoverTask,
        &mut CombatState,
    )>,
) {
    let now = clock.now();
    for (agent_id, alive, position, contacts, cover, mut combat) in query.iter_mut() {
        if !alive.is_alive() || !combat.in_combat {
            continue;
        }
        if !cover.attack_window_open() {
            continue;
        }
        if now - combat.last_swing < config.combat.swing_seconds {
            continue;
        }
        let Some(current) = combat.current_attack.as_ref() else {
            continue;
        };
        let Some(target) = contacts.nearest_hostile(position.0) else {
            continue;
        };
        if position.0.distance(target.position) > current.attack_distance {
            continue;
        }

        pending.hits.push(QueuedHit {
            attacker: agent_id.0.clone(),
            target: target.entity,
            damage: config.combat.attack_damage,
        });
        combat.last_swing = now;
        // The swing consumes the committed attack; the selector picks a new
        // one next tick
        combat.current_attack = None;
    }
}

/// System to apply queued damage and log hits.
pub fn apply_damage(
    clock: Res<Clock>,
    mut pending: ResMut<PendingDamage>,
    mut events: ResMut<TickEvents>,
    mut targets: Query<(&AgentId, &mut Health)>,
) {
    for hit in pending.hits.drain(..) {
        let Ok((target_id, mut health)) = targets.get_mut(hit.target) else {
            continue;
        };
        health.apply_damage(hit.damage);
        events.emit(
            clock.time,
            EventType::AttackHit,
            hit.attacker,
            EventPayload::Outcome(AttackOutcome {
                target: target_id.0.clone(),
                damage: hit.damage,
                target_health_remaining: health.current,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::{Combatant, DetectionRadius, Facing};
    use crate::components::attack::CurrentAttack;
    use crate::systems::perception::Contact;
    use glam::Vec2;

    #[test]
    fn test_swing_queues_damage_and_clears_attack() {
        let mut world = World::new();
        world.insert_resource(Clock::new(0.1));
        world.insert_resource(Config::default());
        world.insert_resource(PendingDamage::new());
        world.insert_resource(TickEvents::new());

        let target = world
            .spawn((
                Combatant,
                AgentId("r1".to_string()),
                Health::new(30.0),
            ))
            .id();

        let mut contacts = VisibleContacts::new();
        contacts.hostiles.push(Contact {
            entity: target,
            id: "r1".to_string(),
            position: Vec2::new(1.0, 0.0),
            forward: Vec2::X,
            health_ratio: 1.0,
        });
        let mut combat = CombatState {
            in_combat: true,
            current_attack: Some(CurrentAttack {
                option_index: 0,
                id: "slash".to_string(),
                attack_distance: 2.0,
                cooldown_ignored: false,
            }),
            last_swing: -10.0,
        };
        combat.in_combat = true;

        world.spawn((
            Combatant,
            AgentId("w1".to_string()),
            Alive::new(),
            Position(Vec2::ZERO),
            Facing(Vec2::X),
            DetectionRadius(10.0),
            contacts,
            CoverTask::new(),
            combat,
        ));

        let mut schedule = Schedule::default();
        schedule.add_systems((execute_attacks, apply_damage).chain());
        schedule.run(&mut world);

        let health = world.get::<Health>(target).unwrap();
        assert!(health.current < 30.0);
        assert!(world.resource::<PendingDamage>().is_empty());

        let mut query = world.query::<(&AgentId, &CombatState)>();
        for (agent_id, combat) in query.iter(&world) {
            if agent_id.0 == "w1" {
                assert!(combat.current_attack.is_none());
            }
        }

        let events = world.resource::<TickEvents>();
        assert_eq!(events.count_of(EventType::AttackHit), 1);
    }

    #[test]
    fn test_out_of_range_target_is_not_hit() {
        let mut world = World::new();
        world.insert_resource(Clock::new(0.1));
        world.insert_resource(Config::default());
        world.insert_resource(PendingDamage::new());
        world.insert_resource(TickEvents::new());

        let target = world
            .spawn((Combatant, AgentId("r1".to_string()), Health::new(30.0)))
            .id();

        let mut contacts = VisibleContacts::new();
        contacts.hostiles.push(Contact {
            entity: target,
            id: "r1".to_string(),
            position: Vec2::new(8.0, 0.0),
            forward: Vec2::X,
            health_ratio: 1.0,
        });

        world.spawn((
            Combatant,
            AgentId("w1".to_string()),
            Alive::new(),
            Position(Vec2::ZERO),
            Facing(Vec2::X),
            DetectionRadius(10.0),
            contacts,
            CoverTask::new(),
            CombatState {
                in_combat: true,
                current_attack: Some(CurrentAttack {
                    option_index: 0,
                    id: "slash".to_string(),
                    attack_distance: 2.0,
                    cooldown_ignored: false,
                }),
                last_swing: -10.0,
            },
        ));

        let mut schedule = Schedule::default();
        schedule.add_systems((execute_attacks, apply_damage).chain());
        schedule.run(&mut world);

        let health = world.get::<Health>(target).unwrap();
        assert_eq!(health.current, 30.0);
    }
}
