//! Cover Node Index
//!
//! Resource owning every cover node in the arena, answering radius queries
//! and arbitrating occupancy claims. A claim is a compare-and-set on the
//! node's occupant so two agents can never both believe they hold the same
//! node, even within one tick.

use bevy_ecs::prelude::*;
use glam::Vec2;
use tracing::debug;

use crate::components::cover::CoverNode;

/// Index of a node within the arena.
pub type NodeId = usize;

#[derive(Resource, Debug, Default)]
pub struct CoverNodeIndex {
    nodes: Vec<CoverNode>,
}

impl CoverNodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: CoverNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn get(&self, id: NodeId) -> Option<&CoverNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CoverNode)> {
        self.nodes.iter().enumerate()
    }

    /// Candidate nodes within `radius` of `position`.
    pub fn nodes_within(&self, position: Vec2, radius: f32) -> Vec<NodeId> {
        let radius_sq = radius * radius;
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.position.distance_squared(position) <= radius_sq)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn occupant(&self, id: NodeId) -> Option<Entity> {
        self.nodes.get(id).and_then(|node| node.occupant)
    }

    /// Claim a node for `agent`. Succeeds when the node is free or already
    /// held by the same agent; fails when another agent holds it.
    pub fn try_claim(&mut self, id: NodeId, agent: Entity) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        match node.occupant {
            None => {
                node.occupant = Some(agent);
                debug!(node = id, ?agent, "cover node claimed");
                true
            }
            Some(holder) => holder == agent,
        }
    }

    /// Release a node held by `agent`. A release by any other entity is
    /// ignored so stale releases cannot evict the current holder.
    pub fn release(&mut self, id: NodeId, agent: Entity) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.occupant == Some(agent) {
                node.occupant = None;
                debug!(node = id, ?agent, "cover node released");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::cover::CoverKind;

    fn node_at(x: f32, y: f32) -> CoverNode {
        CoverNode::new(Vec2::new(x, y), Vec2::X, CoverKind::Stand)
    }

    #[test]
    fn test_nodes_within_radius() {
        let mut index = CoverNodeIndex::new();
        index.add(node_at(1.0, 0.0));
        index.add(node_at(4.0, 0.0));
        index.add(node_at(20.0, 0.0));

        let near = index.nodes_within(Vec2::ZERO, 5.0);
        assert_eq!(near, vec![0, 1]);
    }

    #[test]
    fn test_claim_is_exclusive() {
        let mut index = CoverNodeIndex::new();
        let id = index.add(node_at(0.0, 0.0));
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);

        assert!(index.try_claim(id, a));
        assert!(!index.try_claim(id, b), "second claimant must lose the race");
        assert_eq!(index.occupant(id), Some(a));

        // Re-claim by the holder is idempotent
        assert!(index.try_claim(id, a));
    }

    #[test]
    fn test_release_requires_holder() {
        let mut index = CoverNodeIndex::new();
        let id = index.add(node_at(0.0, 0.0));
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);

        assert!(index.try_claim(id, a));
        index.release(id, b);
        assert_eq!(index.occupant(id), Some(a), "non-holder release is ignored");

        index.release(id, a);
        assert_eq!(index.occupant(id), None);
        assert!(index.try_claim(id, b), "released node is claimable again");
    }
}
