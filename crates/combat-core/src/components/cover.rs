//! Cover Node Data
//!
//! Configuration-time cover node definitions. Occupancy lives in the
//! `CoverNodeIndex` resource alongside the nodes themselves.

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Behavior class of a cover node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverKind {
    /// Repeated hide/peek cycles
    CrouchAndPeak,
    /// One hide phase, then stay up and attack
    CrouchOnce,
    /// No hide phase at all
    Stand,
}

/// A defensible position with a facing cone and cover-type behavior.
#[derive(Debug, Clone)]
pub struct CoverNode {
    pub position: Vec2,
    /// Direction the cover faces (unit vector, away from the wall)
    pub forward: Vec2,
    pub kind: CoverKind,
    /// Full width of the acceptance cone around `forward`, in degrees
    pub angle_limit_degrees: f32,
    /// Whether the agent must reposition for line of sight before attacking
    pub seek_line_of_sight: bool,
    /// Agent currently holding the node, if any
    pub occupant: Option<Entity>,
}

impl CoverNode {
    pub fn new(position: Vec2, forward: Vec2, kind: CoverKind) -> Self {
        Self {
            position,
            forward: forward.normalize_or_zero(),
            kind,
            angle_limit_degrees: 180.0,
            seek_line_of_sight: false,
            occupant: None,
        }
    }

    pub fn with_angle_limit(mut self, degrees: f32) -> Self {
        self.angle_limit_degrees = degrees;
        self
    }

    pub fn seeking_line_of_sight(mut self) -> Self {
        self.seek_line_of_sight = true;
        self
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_is_normalized() {
        let node = CoverNode::new(Vec2::ZERO, Vec2::new(0.0, 5.0), CoverKind::Stand);
        assert!((node.forward.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_builder_flags() {
        let node = CoverNode::new(Vec2::ZERO, Vec2::X, CoverKind::CrouchAndPeak)
            .with_angle_limit(120.0)
            .seeking_line_of_sight();
        assert!((node.angle_limit_degrees - 120.0).abs() < f32::EPSILON);
        assert!(node.seek_line_of_sight);
        assert!(!node.is_occupied());
    }
}
