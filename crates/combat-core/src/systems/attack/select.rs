//! Attack Selection System
//!
//! Picks the next attack from the agent's catalog under cooldown and
//! condition constraints, honoring the catalog's pick policy, then commits
//! the choice (cooldown bookkeeping, distance clamp, stopping distance).

use bevy_ecs::prelude::*;
use rand::Rng;
use tracing::warn;

use combat_events::{AttackSelection, EventPayload, EventType, SelectionPolicy};

use crate::components::agent::{ActiveSummons, AgentId, Alive, DetectionRadius, Health, Position};
use crate::components::attack::{AttackCatalog, CombatState, CurrentAttack, PickPolicy};
use crate::components::cooldown::CooldownTracker;
use crate::events::TickEvents;
use crate::systems::attack::conditions::{condition_holds, ConditionSnapshot};
use crate::systems::cover::{CoverState, CoverTask};
use crate::systems::movement::Navigator;
use crate::systems::perception::VisibleContacts;
use crate::{Clock, CombatRng};

/// Result of one selection pass, before commit.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// Index of the chosen option in the catalog
    pub option_index: usize,
    /// How the option was picked
    pub policy: SelectionPolicy,
    /// True when every option was on cooldown and the pick ignored that
    pub cooldown_ignored: bool,
    /// True when a conditional ability overrode the normal pick
    pub interrupt: bool,
}

/// Whether a catalog entry may be chosen by normal (non-interrupt) selection.
///
/// High-priority gated entries are reserved for the interrupt path; gated
/// non-priority entries require their predicate to hold right now.
fn eligible(
    catalog: &AttackCatalog,
    slot: usize,
    cooldowns: &CooldownTracker,
    snap: &ConditionSnapshot,
    now: f32,
) -> bool {
    let opt = &catalog.options[slot];
    let cooldown_ok =
        opt.ability.is_none() || cooldowns.is_ready(slot, opt.cooldown_seconds, now);
    let gate_ok = match &opt.condition {
        None => true,
        Some(gate) => !gate.high_priority && condition_holds(gate, snap),
    };
    cooldown_ok && gate_ok
}

/// Catalog entries whose gated ability is off cooldown and whose predicate
/// currently holds, regardless of the high-priority flag. A non-empty result
/// overrides whatever the pick policy chose.
pub fn condition_interrupts(
    catalog: &AttackCatalog,
    cooldowns: &CooldownTracker,
    snap: &ConditionSnapshot,
    now: f32,
) -> Vec<usize> {
    catalog
        .options
        .iter()
        .enumerate()
        .filter(|(slot, opt)| {
            opt.ability.is_some()
                && opt.condition.is_some()
                && cooldowns.is_ready(*slot, opt.cooldown_seconds, now)
                && condition_holds(opt.condition.as_ref().unwrap(), snap)
        })
        .map(|(slot, _)| slot)
        .collect()
}

/// Weighted random draw over `available` using cumulative-weight sampling.
/// Ties go to the first entry whose cumulative weight exceeds the roll.
fn weighted_pick<R: Rng>(catalog: &AttackCatalog, available: &[usize], rng: &mut R) -> usize {
    let total: f32 = available
        .iter()
        .map(|&slot| catalog.options[slot].weight)
        .sum();
    if total <= 0.0 {
        // Degenerate weights; fall back to the first eligible entry
        return available[0];
    }
    let mut roll: f32 = rng.gen::<f32>() * total;
    for &slot in available {
        roll -= catalog.options[slot].weight;
        if roll <= 0.0 {
            return slot;
        }
    }
    *available.last().unwrap()
}

/// Select the next attack option.
///
/// Returns `None` only for an empty catalog (caller misconfiguration).
/// Mutates nothing besides the catalog's Order-policy cursor; cooldown
/// bookkeeping happens at commit.
pub fn select_attack<R: Rng>(
    catalog: &mut AttackCatalog,
    cooldowns: &CooldownTracker,
    snap: &ConditionSnapshot,
    now: f32,
    override_policy: bool,
    rng: &mut R,
) -> Option<SelectionOutcome> {
    if catalog.is_empty() {
        warn!("attack selection requested with an empty catalog");
        return None;
    }

    let available: Vec<usize> = (0..catalog.len())
        .filter(|&slot| eligible(catalog, slot, cooldowns, snap, now))
        .collect();

    let mut outcome = if available.is_empty() {
        // Escape hatch: everything is on cooldown or gated. Pick from the
        // full catalog and flag the ignored cooldown so the agent never stalls.
        let slot = rng.gen_range(0..catalog.len());
        warn!(
            option = %catalog.options[slot].id,
            "no eligible attack options; ignoring cooldowns"
        );
        SelectionOutcome {
            option_index: slot,
            policy: SelectionPolicy::CooldownIgnored,
            cooldown_ignored: true,
            interrupt: false,
        }
    } else if override_policy {
        // Forced-reaction attacks bypass the configured policy
        let slot = available[rng.gen_range(0..available.len())];
        SelectionOutcome {
            option_index: slot,
            policy: SelectionPolicy::Override,
            cooldown_ignored: false,
            interrupt: false,
        }
    } else {
        match catalog.policy {
            PickPolicy::Odds => SelectionOutcome {
                option_index: weighted_pick(catalog, &available, rng),
                policy: SelectionPolicy::Odds,
                cooldown_ignored: false,
                interrupt: false,
            },
            PickPolicy::Order => {
                // Scan from the cursor, bounded to one full cycle
                let len = catalog.len();
                let mut chosen = None;
                for step in 0..len {
                    let slot = (catalog.cursor + step) % len;
                    if eligible(catalog, slot, cooldowns, snap, now) {
                        chosen = Some(slot);
                        break;
                    }
                }
                match chosen {
                    Some(slot) => {
                        catalog.advance_cursor_past(slot);
                        SelectionOutcome {
                            option_index: slot,
                            policy: SelectionPolicy::Order,
                            cooldown_ignored: false,
                            interrupt: false,
                        }
                    }
                    None => {
                        // Unreachable while `available` is non-empty; kept as
                        // the documented bound on the cursor scan
                        let slot = rng.gen_range(0..len);
                        SelectionOutcome {
                            option_index: slot,
                            policy: SelectionPolicy::CooldownIgnored,
                            cooldown_ignored: true,
                            interrupt: false,
                        }
                    }
                }
            }
            PickPolicy::Random => SelectionOutcome {
                option_index: available[rng.gen_range(0..available.len())],
                policy: SelectionPolicy::Random,
                cooldown_ignored: false,
                interrupt: false,
            },
        }
    };

    // Priority interrupt check always runs last, even after an override
    let interrupts = condition_interrupts(catalog, cooldowns, snap, now);
    if !interrupts.is_empty() {
        let slot = interrupts[rng.gen_range(0..interrupts.len())];
        outcome = SelectionOutcome {
            option_index: slot,
            policy: SelectionPolicy::Interrupt,
            cooldown_ignored: false,
            interrupt: true,
        };
    }

    Some(outcome)
}

/// System to run attack selection for agents in combat.
///
/// Selection runs when an agent has no committed attack; the interrupt check
/// additionally runs every tick so a high-priority conditional ability can
/// cancel an in-flight action.
#[allow(clippy::type_complexity)]
pub fn select_attacks(
    clock: Res<Clock>,
    mut rng: ResMut<CombatRng>,
    mut events: ResMut<TickEvents>,
    mut query: Query<(
        &AgentId,
        &Alive,
        &Position,
        &DetectionRadius,
        &Health,
        &ActiveSummons,
        &VisibleContacts,
        &CoverTask,
        &mut CombatState,
        &mut AttackCatalog,
        &mut CooldownTracker,
        &mut Navigator,
    )>,
) {
    let now = clock.now();
    for (
        agent_id,
        alive,
        position,
        detection,
        health,
        summons,
        contacts,
        cover,
        mut combat,
        mut catalog,
        mut cooldowns,
        mut navigator,
    ) in query.iter_mut()
    {
        if !alive.is_alive() || !combat.in_combat || catalog.is_empty() {
            continue;
        }
        // En route to cover the travel path owns the navigator; committing
        // an attack here would overwrite its stopping distance and strand
        // the agent short of the node
        if cover.state() == CoverState::MovingToCover {
            continue;
        }

        let snap = ConditionSnapshot {
            position: position.0,
            health_ratio: health.ratio(),
            active_summons: summons.0,
            contacts,
        };

        if combat.current_attack.is_some()
            && condition_interrupts(&catalog, &cooldowns, &snap, now).is_empty()
        {
            continue;
        }

        let Some(outcome) = select_attack(&mut catalog, &cooldowns, &snap, now, false, &mut rng.0)
        else {
            continue;
        };

        let opt = &catalog.options[outcome.option_index];
        let attack_distance = opt.attack_distance.min(detection.0);

        if outcome.interrupt {
            // Cancel the in-flight action and reset only the interrupting
            // ability's cooldown baseline
            navigator.cancel();
            cooldowns.reset_baseline(outcome.option_index, now);
            events.emit(
                clock.time,
                EventType::ConditionInterrupt,
                agent_id.0.clone(),
                EventPayload::Selection(AttackSelection {
                    option: opt.id.clone(),
                    policy: outcome.policy,
                    cooldown_ignored: false,
                    attack_distance,
                }),
            );
        } else if opt.ability.is_some() {
            cooldowns.mark_used(outcome.option_index, now);
        }

        combat.current_attack = Some(CurrentAttack {
            option_index: outcome.option_index,
            id: opt.id.clone(),
            attack_distance,
            cooldown_ignored: outcome.cooldown_ignored,
        });
        // Already engaged: the clamped attack distance becomes the movement
        // stopping distance
        navigator.stopping_distance = attack_distance;

        events.emit(
            clock.time,
            EventType::AttackSelected,
            agent_id.0.clone(),
            EventPayload::Selection(AttackSelection {
                option: opt.id.clone(),
                policy: outcome.policy,
                cooldown_ignored: outcome.cooldown_ignored,
                attack_distance,
            }),
        );
    }
}
