//! Faction Components
//!
//! Faction membership and the friend/enemy relation query.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Unique identifier for a faction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub String);

impl From<&str> for FactionId {
    fn from(s: &str) -> Self {
        FactionId(s.to_string())
    }
}

impl From<String> for FactionId {
    fn from(s: String) -> Self {
        FactionId(s)
    }
}

/// Component: An agent's membership in a faction
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct FactionMembership {
    pub faction_id: FactionId,
}

impl FactionMembership {
    pub fn new(faction_id: impl Into<FactionId>) -> Self {
        Self {
            faction_id: faction_id.into(),
        }
    }
}

/// Relation between two agents' factions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Friendly,
    Hostile,
}

impl Relation {
    pub fn is_hostile(self) -> bool {
        matches!(self, Relation::Hostile)
    }
}

/// Resource holding declared hostilities between factions.
///
/// Same faction is always friendly; undeclared pairs default to friendly.
#[derive(Resource, Debug, Clone, Default)]
pub struct FactionRegistry {
    hostilities: HashSet<(FactionId, FactionId)>,
}

impl FactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare two factions hostile to each other (symmetric).
    pub fn declare_hostile(&mut self, a: impl Into<FactionId>, b: impl Into<FactionId>) {
        let (a, b) = (a.into(), b.into());
        if a == b {
            return;
        }
        self.hostilities.insert(Self::ordered(a, b));
    }

    /// Relation between two factions.
    pub fn relation(&self, a: &FactionId, b: &FactionId) -> Relation {
        if a == b {
            return Relation::Friendly;
        }
        let key = Self::ordered(a.clone(), b.clone());
        if self.hostilities.contains(&key) {
            Relation::Hostile
        } else {
            Relation::Friendly
        }
    }

    fn ordered(a: FactionId, b: FactionId) -> (FactionId, FactionId) {
        if a.0 <= b.0 {
            (a, b)
        } else {
            (b, a)
        }
    }
}
