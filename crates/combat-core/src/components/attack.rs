//! Attack Catalog Components
//!
//! Configuration-time attack options and the per-agent runtime combat state.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Rule governing how the next attack option is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickPolicy {
    /// Weighted random draw over eligible options
    Odds,
    /// Round-robin over the catalog in insertion order
    Order,
    /// Uniform random over eligible options
    Random,
}

/// Runtime predicate type gating a conditional ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityCondition {
    SelfLowHealth,
    AllyLowHealth,
    NoActiveSummons,
    DistanceFromTarget,
}

/// Direction of the threshold comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    LessThan,
    GreaterThan,
}

impl Comparison {
    pub fn compare(self, value: f32, threshold: f32) -> bool {
        match self {
            Comparison::LessThan => value < threshold,
            Comparison::GreaterThan => value > threshold,
        }
    }
}

/// A runtime predicate gating an attack option's ability.
///
/// High-priority gated options are excluded from normal selection and only
/// fire through the condition interrupt path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionalAbility {
    pub condition: AbilityCondition,
    pub comparison: Comparison,
    pub threshold: f32,
    pub high_priority: bool,
}

/// One configured attack or ability the selector can choose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackOption {
    /// Identifier used in logs and events
    pub id: String,
    /// Animation reference handed to the presentation layer
    pub animation: String,
    /// Optional ability reference; options without one never cool down
    pub ability: Option<String>,
    /// Odds-policy weight
    pub weight: f32,
    /// Preferred engagement distance
    pub attack_distance: f32,
    /// Distance under which the option is considered crowded
    pub too_close_distance: f32,
    /// Cooldown length in seconds (0 when no ability is attached)
    pub cooldown_seconds: f32,
    /// Optional condition gate
    pub condition: Option<ConditionalAbility>,
}

impl AttackOption {
    /// A plain attack with no ability attached.
    pub fn basic(id: impl Into<String>, weight: f32, attack_distance: f32) -> Self {
        let id = id.into();
        Self {
            animation: format!("anim_{}", id),
            id,
            ability: None,
            weight,
            attack_distance,
            too_close_distance: 0.0,
            cooldown_seconds: 0.0,
            condition: None,
        }
    }

    /// An attack backed by an ability with a cooldown.
    pub fn with_ability(
        id: impl Into<String>,
        ability: impl Into<String>,
        weight: f32,
        attack_distance: f32,
        cooldown_seconds: f32,
    ) -> Self {
        let id = id.into();
        Self {
            animation: format!("anim_{}", id),
            id,
            ability: Some(ability.into()),
            weight,
            attack_distance,
            too_close_distance: 0.0,
            cooldown_seconds,
            condition: None,
        }
    }

    pub fn gated(mut self, condition: ConditionalAbility) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// Ordered catalog of attack options with a pick policy.
///
/// Insertion order is significant for the Order policy; the cursor persists
/// across selections and wraps modulo the catalog length.
#[derive(Component, Debug, Clone)]
pub struct AttackCatalog {
    pub options: Vec<AttackOption>,
    pub policy: PickPolicy,
    pub cursor: usize,
}

impl AttackCatalog {
    pub fn new(options: Vec<AttackOption>, policy: PickPolicy) -> Self {
        Self {
            options,
            policy,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Advance the Order-policy cursor past `index`, wrapping at the end.
    pub fn advance_cursor_past(&mut self, index: usize) {
        if !self.options.is_empty() {
            self.cursor = (index + 1) % self.options.len();
        }
    }
}

/// The attack the agent is currently committed to.
#[derive(Debug, Clone)]
pub struct CurrentAttack {
    /// Index into the agent's catalog
    pub option_index: usize,
    pub id: String,
    /// Attack distance after clamping to the detection radius
    pub attack_distance: f32,
    /// True when the pick deliberately ignored an unelapsed cooldown
    pub cooldown_ignored: bool,
}

/// Per-agent combat runtime state.
///
/// Created with defaults when the agent enters combat and reset when combat
/// ends or the agent dies.
#[derive(Component, Debug, Clone, Default)]
pub struct CombatState {
    pub in_combat: bool,
    pub current_attack: Option<CurrentAttack>,
    /// Simulation time of the last attack swing
    pub last_swing: f32,
}

impl CombatState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
