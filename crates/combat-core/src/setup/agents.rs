//! Agent Spawning
//!
//! Attack catalogs for each faction and the component bundles that make a
//! combatant.

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::agent::{
    ActiveSummons, AgentId, Alive, Combatant, DetectionRadius, Facing, Health, PoseFlags, Position,
};
use crate::components::attack::{
    AbilityCondition, AttackCatalog, AttackOption, CombatState, Comparison, ConditionalAbility,
    PickPolicy,
};
use crate::components::cooldown::CooldownTracker;
use crate::components::faction::FactionMembership;
use crate::config::Config;
use crate::systems::cover::CoverTask;
use crate::systems::movement::Navigator;
use crate::systems::perception::VisibleContacts;

/// Catalog for warden agents: weighted draw with a high-priority heal.
pub fn warden_catalog() -> AttackCatalog {
    AttackCatalog::new(
        vec![
            AttackOption::basic("slash", 5.0, 2.0),
            AttackOption::basic("lunge", 2.0, 3.5),
            AttackOption::with_ability("guard_break", "ability_guard_break", 2.0, 2.5, 6.0),
            AttackOption::with_ability("second_wind", "ability_second_wind", 1.0, 2.0, 20.0).gated(
                ConditionalAbility {
                    condition: AbilityCondition::SelfLowHealth,
                    comparison: Comparison::LessThan,
                    threshold: 0.35,
                    high_priority: true,
                },
            ),
        ],
        PickPolicy::Odds,
    )
}

/// Catalog for ravager agents: round-robin with a summon gate.
pub fn ravager_catalog() -> AttackCatalog {
    AttackCatalog::new(
        vec![
            AttackOption::basic("claw", 1.0, 2.0),
            AttackOption::basic("bite", 1.0, 1.5),
            AttackOption::with_ability("frenzy", "ability_frenzy", 1.0, 2.5, 8.0),
            AttackOption::with_ability("spine_burst", "ability_spine_burst", 1.0, 6.0, 15.0).gated(
                ConditionalAbility {
                    condition: AbilityCondition::DistanceFromTarget,
                    comparison: Comparison::GreaterThan,
                    threshold: 4.0,
                    high_priority: false,
                },
            ),
        ],
        PickPolicy::Order,
    )
}

fn spawn_agent(
    world: &mut World,
    id: &str,
    faction: &str,
    position: Vec2,
    facing: Vec2,
    catalog: AttackCatalog,
    config: &Config,
) {
    world.spawn((
        (
            Combatant,
            AgentId(id.to_string()),
            FactionMembership::new(faction),
            Position(position),
            Facing(facing),
            DetectionRadius(30.0),
            Health::new(120.0),
            Alive::new(),
        ),
        (
            ActiveSummons(0),
            PoseFlags::default(),
            VisibleContacts::new(),
            Navigator::new(
                config.combat.move_speed,
                config.combat.default_stopping_distance,
            ),
            CombatState::default(),
            CooldownTracker::new(),
            catalog,
            CoverTask::new(),
        ),
    ));
}

/// Spawn both squads facing each other across the arena. Returns the number
/// of agents spawned.
pub fn spawn_combatants(world: &mut World, config: &Config) -> usize {
    let warden_spawns = [
        Vec2::new(-12.0, 3.0),
        Vec2::new(-12.0, 0.0),
        Vec2::new(-12.0, -3.0),
    ];
    let ravager_spawns = [
        Vec2::new(12.0, 3.0),
        Vec2::new(12.0, 0.0),
        Vec2::new(12.0, -3.0),
    ];

    for (i, pos) in warden_spawns.iter().enumerate() {
        spawn_agent(
            world,
            &format!("warden_{}", i + 1),
            "wardens",
            *pos,
            Vec2::X,
            warden_catalog(),
            config,
        );
    }
    for (i, pos) in ravager_spawns.iter().enumerate() {
        spawn_agent(
            world,
            &format!("ravager_{}", i + 1),
            "ravagers",
            *pos,
            Vec2::NEG_X,
            ravager_catalog(),
            config,
        );
    }
    warden_spawns.len() + ravager_spawns.len()
}
