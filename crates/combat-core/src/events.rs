//! Per-tick event log resource.
//!
//! Systems push structured events here; the binary drains and reports them
//! at the end of each tick.

use bevy_ecs::prelude::*;

use combat_events::{Event, EventPayload, EventType, SimTime};

/// Resource storing events generated this tick
#[derive(Resource, Debug, Default)]
pub struct TickEvents {
    pub events: Vec<Event>,
    next_event_id: u64,
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_id(&mut self) -> String {
        let id = format!("evt_{:08}", self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Build and push an event in one call.
    pub fn emit(
        &mut self,
        time: SimTime,
        event_type: EventType,
        agent: impl Into<String>,
        payload: EventPayload,
    ) {
        let id = self.generate_id();
        self.push(Event::new(id, time, event_type, agent, payload));
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Count events of a given type in the current tick.
    pub fn count_of(&self, event_type: EventType) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}
