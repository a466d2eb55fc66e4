//! Determinism verification
//!
//! The full skirmish must produce an identical event log when re-run with
//! the same seed, and a different one with a different seed.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use combat_core::systems::{
    apply_damage, build_agent_directory, drive_cover_tasks, execute_attacks, handle_deaths,
    integrate_movement, select_attacks, update_combat_status, update_perception, AgentDirectory,
    PendingDamage,
};
use combat_core::{setup, Clock, CombatRng, Config, TickEvents};

/// Run the standard arena for `ticks` and return the serialized event log.
fn run_skirmish(seed: u64, ticks: u64) -> Vec<String> {
    let config = Config::default();

    let mut world = World::new();
    world.insert_resource(Clock::new(0.05));
    world.insert_resource(CombatRng(SmallRng::seed_from_u64(seed)));
    world.insert_resource(config.clone());
    world.insert_resource(TickEvents::new());
    world.insert_resource(PendingDamage::new());
    world.insert_resource(AgentDirectory::default());
    world.insert_resource(setup::create_factions());
    world.insert_resource(setup::create_cover_nodes());
    setup::spawn_combatants(&mut world, &config);

    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            build_agent_directory,
            update_perception,
            update_combat_status,
            select_attacks,
            drive_cover_tasks,
            execute_attacks,
            apply_damage,
            handle_deaths,
            integrate_movement,
        )
            .chain(),
    );

    let mut log = Vec::new();
    for _ in 0..ticks {
        schedule.run(&mut world);
        for event in world.resource_mut::<TickEvents>().drain() {
            log.push(serde_json::to_string(&event).expect("event serializes"));
        }
        world.resource_mut::<Clock>().advance();
    }
    log
}

#[test]
fn test_same_seed_produces_identical_event_logs() {
    let first = run_skirmish(42, 600);
    let second = run_skirmish(42, 600);
    assert!(!first.is_empty(), "the skirmish should produce events");
    assert_eq!(first, second);
}

#[test]
fn test_different_seeds_diverge() {
    let first = run_skirmish(42, 600);
    let second = run_skirmish(1337, 600);
    assert_ne!(first, second, "different seeds should change the skirmish");
}

#[test]
fn test_event_ids_are_sequential_per_run() {
    let log = run_skirmish(7, 300);
    for (i, line) in log.iter().enumerate() {
        let expected = format!("\"event_id\":\"evt_{:08}\"", i);
        assert!(
            line.contains(&expected),
            "event {} missing sequential id: {}",
            i,
            line
        );
    }
}
