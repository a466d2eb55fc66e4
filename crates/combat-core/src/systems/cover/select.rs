//! Cover Selection
//!
//! Multi-stage filter chain over candidate cover nodes, followed by a
//! randomized pick among the closest few survivors and an occupancy claim.
//! Distance only builds the shortlist; the final choice is randomized so
//! agents do not all converge on the single closest node.

use bevy_ecs::prelude::*;
use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::config::CoverTuning;
use crate::systems::cover::index::{CoverNodeIndex, NodeId};
use crate::systems::perception::Contact;

/// Inputs to one cover search.
#[derive(Debug)]
pub struct CoverSearch<'a> {
    pub agent: Entity,
    pub agent_pos: Vec2,
    /// Node the agent used last, excluded when alternatives exist
    pub prior_node: Option<NodeId>,
    /// Currently visible hostiles
    pub hostiles: &'a [Contact],
}

/// Unsigned angle between two directions in degrees. Degenerate vectors
/// report 180 so they fail every cone test.
fn angle_degrees(a: Vec2, b: Vec2) -> f32 {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    if a == Vec2::ZERO || b == Vec2::ZERO {
        return 180.0;
    }
    a.angle_between(b).abs().to_degrees()
}

/// Whether an unoccupied candidate passes all rejection filters.
fn passes_filters(
    node_id: NodeId,
    index: &CoverNodeIndex,
    search: &CoverSearch,
    cfg: &CoverTuning,
) -> bool {
    let node = match index.get(node_id) {
        Some(n) => n,
        None => return false,
    };

    // Facing plausibility: the node must sit in front of at least one
    // visible hostile
    let plausible = search.hostiles.iter().any(|h| {
        angle_degrees(h.forward, node.position - h.position) <= cfg.facing_plausibility_degrees
    });
    if !plausible {
        return false;
    }

    // Minimum distance from every visible hostile
    if search
        .hostiles
        .iter()
        .any(|h| node.position.distance(h.position) < cfg.min_cover_distance)
    {
        return false;
    }

    // Node facing cone: every hostile must lie inside the node's half-angle
    let half_cone = node.angle_limit_degrees / 2.0;
    if search
        .hostiles
        .iter()
        .any(|h| angle_degrees(node.forward, h.position - node.position) > half_cone)
    {
        return false;
    }

    // Travel cap
    search.agent_pos.distance(node.position) <= cfg.max_travel_distance
}

/// Find and claim a cover node for the agent.
///
/// Returns the claimed node id, or `None` when no candidate survives the
/// filter chain. The returned node is never one held by a different agent.
pub fn find_cover_node<R: Rng>(
    index: &mut CoverNodeIndex,
    search: &CoverSearch,
    is_hostile_holder: impl Fn(Entity) -> bool,
    cfg: &CoverTuning,
    rng: &mut R,
) -> Option<NodeId> {
    let candidates = index.nodes_within(search.agent_pos, cfg.search_radius);

    // Partition; occupied nodes are retained for the enemy-adjacency filter
    let (occupied, unoccupied): (Vec<NodeId>, Vec<NodeId>) = candidates
        .into_iter()
        .partition(|&id| index.occupant(id).is_some());

    let mut survivors: Vec<NodeId> = unoccupied
        .into_iter()
        .filter(|&id| passes_filters(id, index, search, cfg))
        .collect();

    // Skip the node used last time when an alternative exists
    if let Some(prior) = search.prior_node {
        if survivors.len() > 1 {
            survivors.retain(|&id| id != prior);
        }
    }

    // Avoid clustering near enemy-held cover
    let enemy_held: Vec<Vec2> = occupied
        .iter()
        .filter_map(|&id| {
            let holder = index.occupant(id)?;
            if !is_hostile_holder(holder) {
                return None;
            }
            index.get(id).map(|n| n.position)
        })
        .collect();
    survivors.retain(|&id| {
        let Some(node) = index.get(id) else {
            return false;
        };
        !enemy_held
            .iter()
            .any(|&pos| node.position.distance(pos) < cfg.min_cover_distance)
    });

    if survivors.is_empty() {
        debug!(agent = ?search.agent, "no cover candidates survived filtering");
        return None;
    }

    // Closest-first shortlist, then a uniform pick among it
    survivors.sort_by(|&a, &b| {
        let da = index.get(a).map(|n| n.position.distance_squared(search.agent_pos));
        let db = index.get(b).map(|n| n.position.distance_squared(search.agent_pos));
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
    survivors.truncate(cfg.shortlist_size.max(1));

    // Release the previous claim before taking the new one
    if let Some(prior) = search.prior_node {
        index.release(prior, search.agent);
    }

    let mut shortlist = survivors;
    while !shortlist.is_empty() {
        let pick = shortlist.swap_remove(rng.gen_range(0..shortlist.len()));
        if index.try_claim(pick, search.agent) {
            return Some(pick);
        }
        // Lost the claim to another agent; try the next shortlist entry
    }
    None
}
