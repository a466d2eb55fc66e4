//! Event Types
//!
//! All event type definitions matching the combat log output schema.

use serde::{Deserialize, Serialize};

use crate::SimTime;

/// Primary event type categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// An attack option was committed by the selector
    AttackSelected,
    /// A high-priority conditional ability overrode the normal pick
    ConditionInterrupt,
    /// A cover node occupancy claim succeeded
    CoverClaimed,
    /// A cover node occupancy claim was released
    CoverReleased,
    /// The cover state machine changed state
    CoverState,
    /// An attack landed on a target
    AttackHit,
    /// An agent died
    Death,
}

impl EventType {
    /// Returns all event type variants.
    pub fn all() -> &'static [EventType] {
        &[
            EventType::AttackSelected,
            EventType::ConditionInterrupt,
            EventType::CoverClaimed,
            EventType::CoverReleased,
            EventType::CoverState,
            EventType::AttackHit,
            EventType::Death,
        ]
    }
}

/// Which pick policy produced an attack selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    Odds,
    Order,
    Random,
    /// Policy was bypassed by a forced-reaction override
    Override,
    /// Every option was on cooldown; picked from the full catalog anyway
    CooldownIgnored,
    /// A conditional ability interrupted the normal selection
    Interrupt,
}

/// Payload for attack selection events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackSelection {
    /// Identifier of the chosen attack option
    pub option: String,
    /// How the option was picked
    pub policy: SelectionPolicy,
    /// True when the pick deliberately ignored an unelapsed cooldown
    #[serde(default)]
    pub cooldown_ignored: bool,
    /// Attack distance after clamping to the agent's detection radius
    pub attack_distance: f32,
}

/// Payload for cover claim/release events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverChange {
    /// Index of the cover node in the arena
    pub node: usize,
    /// Distance from the agent to the node at claim time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

/// Payload for cover state machine transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverTransition {
    pub from: String,
    pub to: String,
}

/// Payload for damage events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub target: String,
    pub damage: f32,
    pub target_health_remaining: f32,
}

/// Event-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Selection(AttackSelection),
    Cover(CoverChange),
    Transition(CoverTransition),
    Outcome(AttackOutcome),
    None {},
}

/// A single combat log event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g., "evt_00000042")
    pub event_id: String,
    /// When the event occurred
    pub time: SimTime,
    /// Primary event category
    pub event_type: EventType,
    /// Agent the event concerns
    pub agent: String,
    /// Event-specific data
    pub payload: EventPayload,
}

impl Event {
    /// Create a new event with required fields.
    pub fn new(
        event_id: impl Into<String>,
        time: SimTime,
        event_type: EventType,
        agent: impl Into<String>,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            time,
            event_type,
            agent: agent.into(),
            payload,
        }
    }
}
