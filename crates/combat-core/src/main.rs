//! Skirmish Simulation
//!
//! Headless arena driver: two squads with attack catalogs and cover between
//! them, run for a fixed number of ticks with a seeded RNG. Every decision
//! the core makes lands in the event log.

use bevy_ecs::prelude::*;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use combat_core::systems::{
    apply_damage, build_agent_directory, drive_cover_tasks, execute_attacks, handle_deaths,
    integrate_movement, select_attacks, update_combat_status, update_perception, PendingDamage,
};
use combat_core::{setup, Alive, Clock, CombatRng, Config, FactionMembership, TickEvents};
use combat_events::EventType;

/// Command line arguments for the skirmish driver
#[derive(Parser, Debug)]
#[command(name = "skirmish_sim")]
#[command(about = "A headless combat decision-core skirmish")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1200)]
    ticks: u64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 0.05)]
    tick_seconds: f32,

    /// Path to the tuning file
    #[arg(long, default_value = "tuning.toml")]
    tuning: PathBuf,

    /// Write the event log as JSON lines to this path
    #[arg(long)]
    log_events: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    println!("Skirmish Simulation");
    println!("===================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {} ({}s per tick)", args.ticks, args.tick_seconds);
    println!();

    let config = Config::load_or_default(&args.tuning);

    let mut log = args.log_events.as_ref().map(|path| {
        let file = File::create(path)
            .unwrap_or_else(|e| panic!("cannot create event log {}: {}", path.display(), e));
        BufWriter::new(file)
    });

    // Initialize the ECS world
    let mut world = World::new();
    world.insert_resource(Clock::new(args.tick_seconds));
    world.insert_resource(CombatRng(SmallRng::seed_from_u64(args.seed)));
    world.insert_resource(config.clone());
    world.insert_resource(TickEvents::new());
    world.insert_resource(PendingDamage::new());
    world.insert_resource(combat_core::systems::AgentDirectory::default());

    println!("Creating factions...");
    world.insert_resource(setup::create_factions());

    println!("Placing cover...");
    let nodes = setup::create_cover_nodes();
    println!("  Placed {} cover nodes", nodes.len());
    world.insert_resource(nodes);

    println!("Spawning combatants...");
    let spawned = setup::spawn_combatants(&mut world, &config);
    println!("  Spawned {} agents", spawned);
    println!();

    // One fully ordered pass per tick; selection and cover both draw from
    // the shared RNG, so ordering is part of determinism
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

    println!("Starting skirmish...");
    let mut total_events = 0usize;
    for tick in 0..args.ticks {
        schedule.run(&mut world);

        let drained = world.resource_mut::<TickEvents>().drain();
        total_events += drained.len();
        if let Some(log) = log.as_mut() {
            for event in &drained {
                match serde_json::to_string(event) {
                    Ok(line) => {
                        if let Err(e) = writeln!(log, "{}", line) {
                            eprintln!("Warning: event log write failed: {}", e);
                        }
                    }
                    Err(e) => eprintln!("Warning: could not serialize event: {}", e),
                }
            }
        }

        if !drained.is_empty() && tick % 40 == 0 {
            let mut selections = 0;
            let mut hits = 0;
            let mut cover = 0;
            for event in &drained {
                match event.event_type {
                    EventType::AttackSelected => selections += 1,
                    EventType::AttackHit => hits += 1,
                    EventType::CoverClaimed | EventType::CoverState => cover += 1,
                    _ => {}
                }
            }
            println!(
                "[Tick {:>5}] {} - {} events (selections: {}, hits: {}, cover: {})",
                tick,
                world.resource::<Clock>().time,
                drained.len(),
                selections,
                hits,
                cover
            );
        }

        world.resource_mut::<Clock>().advance();
    }

    if let Some(log) = log.as_mut() {
        if let Err(e) = log.flush() {
            eprintln!("Warning: event log flush failed: {}", e);
        }
    }

    println!();
    println!(
        "Skirmish complete. Ran {} ticks, {} events.",
        args.ticks, total_events
    );
    let mut query = world.query::<(&FactionMembership, &Alive)>();
    let mut wardens = 0;
    let mut ravagers = 0;
    for (membership, alive) in query.iter(&world) {
        if alive.is_alive() {
            match membership.faction_id.0.as_str() {
                "wardens" => wardens += 1,
                "ravagers" => ravagers += 1,
                _ => {}
            }
        }
    }
    println!("Survivors: {} wardens, {} ravagers.", wardens, ravagers);
}
