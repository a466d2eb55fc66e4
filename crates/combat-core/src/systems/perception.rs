//! Perception System
//!
//! Builds a per-tick directory of all agents, then updates each agent's
//! view of visible hostiles and allies within its detection radius.

use bevy_ecs::prelude::*;
use glam::Vec2;
use std::collections::BTreeMap;

use crate::components::agent::{AgentId, Alive, DetectionRadius, Facing, Health, Position};
use crate::components::faction::{FactionId, FactionMembership, FactionRegistry, Relation};

/// Snapshot of one perceived agent.
#[derive(Debug, Clone)]
pub struct Contact {
    pub entity: Entity,
    pub id: String,
    pub position: Vec2,
    pub forward: Vec2,
    pub health_ratio: f32,
}

/// Component tracking what an agent can currently see.
///
/// `target_obstructed` is a mutable flag owned by perception but written by
/// the cover state machine while the agent is behind cover.
#[derive(Component, Debug, Clone, Default)]
pub struct VisibleContacts {
    pub hostiles: Vec<Contact>,
    pub allies: Vec<Contact>,
    pub target_obstructed: bool,
}

impl VisibleContacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest visible hostile to `from`, the agent's current target.
    pub fn nearest_hostile(&self, from: Vec2) -> Option<&Contact> {
        self.hostiles.iter().min_by(|a, b| {
            a.position
                .distance_squared(from)
                .partial_cmp(&b.position.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    pub fn has_hostiles(&self) -> bool {
        !self.hostiles.is_empty()
    }
}

/// Per-tick snapshot of every living agent, keyed by entity.
///
/// Built before perception so that systems holding mutable component
/// borrows can still look up other agents.
#[derive(Resource, Debug, Default)]
pub struct AgentDirectory {
    entries: BTreeMap<Entity, DirectoryEntry>,
}

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub id: String,
    pub faction_id: FactionId,
    pub position: Vec2,
    pub forward: Vec2,
    pub health_ratio: f32,
    pub alive: bool,
}

impl AgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn insert(&mut self, entity: Entity, entry: DirectoryEntry) {
        self.entries.insert(entity, entry);
    }

    pub fn get(&self, entity: Entity) -> Option<&DirectoryEntry> {
        self.entries.get(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &DirectoryEntry)> {
        self.entries.iter().map(|(e, d)| (*e, d))
    }

    /// Whether `other` is hostile to the faction `faction_id`.
    pub fn is_hostile_to(
        &self,
        registry: &FactionRegistry,
        faction_id: &FactionId,
        other: Entity,
    ) -> bool {
        self.get(other)
            .map(|entry| {
                registry
                    .relation(faction_id, &entry.faction_id)
                    .is_hostile()
            })
            .unwrap_or(false)
    }
}

/// System to rebuild the agent directory. Runs first each tick.
pub fn build_agent_directory(
    mut directory: ResMut<AgentDirectory>,
    query: Query<(
        Entity,
        &AgentId,
        &FactionMembership,
        &Position,
        &Facing,
        &Health,
        &Alive,
    )>,
) {
    directory.clear();
    for (entity, agent_id, membership, position, facing, health, alive) in query.iter() {
        directory.insert(
            entity,
            DirectoryEntry {
                id: agent_id.0.clone(),
                faction_id: membership.faction_id.clone(),
                position: position.0,
                forward: facing.0,
                health_ratio: health.ratio(),
                alive: alive.is_alive(),
            },
        );
    }
}

/// System to update each agent's visible hostiles and allies.
pub fn update_perception(
    directory: Res<AgentDirectory>,
    registry: Res<FactionRegistry>,
    mut query: Query<(
        Entity,
        &FactionMembership,
        &Position,
        &DetectionRadius,
        &Alive,
        &mut VisibleContacts,
    )>,
) {
    for (entity, membership, position, radius, alive, mut contacts) in query.iter_mut() {
        contacts.hostiles.clear();
        contacts.allies.clear();
        if !alive.is_alive() {
            continue;
        }

        for (other, entry) in directory.iter() {
            if other == entity || !entry.alive {
                continue;
            }
            if position.0.distance(entry.position) > radius.0 {
                continue;
            }
            let contact = Contact {
                entity: other,
                id: entry.id.clone(),
                position: entry.position,
                forward: entry.forward,
                health_ratio: entry.health_ratio,
            };
            match registry.relation(&membership.faction_id, &entry.faction_id) {
                Relation::Hostile => contacts.hostiles.push(contact),
                Relation::Friendly => contacts.allies.push(contact),
            }
        }
    }
}

/// Compute an unobstructed firing position near `from` against `target`.
///
/// Steps laterally off the line of fire; real occlusion raycasts belong to
/// the perception collaborator and are out of scope here.
pub fn unobstructed_position(from: Vec2, target: Vec2, offset: f32) -> Vec2 {
    let dir = (target - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return from;
    }
    let lateral = Vec2::new(-dir.y, dir.x);
    from + lateral * offset + dir * (offset * 0.25)
}
