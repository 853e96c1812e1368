//! Typed events for the presentation layer
//!
//! The simulation never calls out to UI code. It appends events here in the
//! order things happen and the frame loop drains them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hazard::{HazardId, HazardKind};
use super::session::{SessionOutcome, SessionPhase};
use super::world::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    HealthChanged { entity: EntityId, health: u32 },
    /// Always preceded by the `HealthChanged` that took health to zero
    EntityDied { entity: EntityId },
    EntitySaved { saved: u32 },
    SessionChanged { from: SessionPhase, to: SessionPhase },
    SessionEnded { outcome: SessionOutcome },
    HazardSpawned { hazard: HazardId, kind: HazardKind, pos: Vec2 },
    HazardDespawned { hazard: HazardId },
}

/// FIFO event buffer with deterministic delivery order
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
