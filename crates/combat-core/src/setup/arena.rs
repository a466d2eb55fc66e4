//! Arena Setup
//!
//! Creates the two warring factions and scatters cover nodes between their
//! spawn lines.

use glam::Vec2;

use crate::components::cover::{CoverKind, CoverNode};
use crate::components::faction::FactionRegistry;
use crate::systems::cover::CoverNodeIndex;

/// Create the factions and declare their hostility
pub fn create_factions() -> FactionRegistry {
    let mut registry = FactionRegistry::new();
    registry.declare_hostile("wardens", "ravagers");
    registry
}

/// Place cover nodes in the arena.
///
/// Two loose lines of cover face each faction's approach, with a few
/// contested pieces near the center line. Forward vectors point at the
/// opposing spawn so the facing-cone filter has teeth.
pub fn create_cover_nodes() -> CoverNodeIndex {
    let mut index = CoverNodeIndex::new();

    // Warden-side line, facing the ravager approach (+X)
    index.add(CoverNode::new(Vec2::new(-5.0, 4.0), Vec2::X, CoverKind::CrouchAndPeak));
    index.add(CoverNode::new(Vec2::new(-5.0, -4.0), Vec2::X, CoverKind::CrouchAndPeak));
    index.add(
        CoverNode::new(Vec2::new(-4.0, 0.0), Vec2::X, CoverKind::CrouchOnce).with_angle_limit(140.0),
    );

    // Ravager-side line, facing the warden approach (-X)
    index.add(CoverNode::new(Vec2::new(5.0, 4.0), Vec2::NEG_X, CoverKind::CrouchAndPeak));
    index.add(CoverNode::new(Vec2::new(5.0, -4.0), Vec2::NEG_X, CoverKind::CrouchAndPeak));
    index.add(
        CoverNode::new(Vec2::new(4.0, 0.0), Vec2::NEG_X, CoverKind::CrouchOnce)
            .with_angle_limit(140.0),
    );

    // Contested center pieces; standing cover with line-of-sight seeking
    index.add(
        CoverNode::new(Vec2::new(0.0, 6.0), Vec2::new(0.0, -1.0), CoverKind::Stand)
            .seeking_line_of_sight(),
    );
    index.add(
        CoverNode::new(Vec2::new(0.0, -6.0), Vec2::new(0.0, 1.0), CoverKind::Stand)
            .seeking_line_of_sight(),
    );

    index
}
