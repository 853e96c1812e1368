//! Entity registry
//!
//! Protectable entities and hazards live in separate id-sorted lists, updated
//! incrementally on spawn and removal. Nothing is ever looked up by scanning
//! names or tags.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{EventQueue, GameEvent};
use super::hazard::{Hazard, HazardId, HazardSpec};
use super::health::{Health, HealthOutcome};
use crate::config::{HealthConfig, WorldBounds};
use crate::consts::{IMPULSE_DAMPING, IMPULSE_EPSILON};
use crate::error::Result;

/// Handle to a protectable entity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(pub u32);

/// An actor whose survival decides the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Protectable {
    pub id: EntityId,
    pub pos: Vec2,
    /// Where the entity returns to on restart
    pub home: Vec2,
    /// Movement intent supplied by the input layer
    pub move_vel: Vec2,
    /// Knockback velocity, decays every tick
    pub impulse: Vec2,
    pub radius: f32,
    health: Health,
}

impl Protectable {
    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    pub fn take_damage(&mut self, amount: u32, events: &mut EventQueue) -> HealthOutcome {
        let outcome = self.health.damage(amount);
        self.notify(outcome, events);
        outcome
    }

    pub fn heal(&mut self, amount: u32, events: &mut EventQueue) -> HealthOutcome {
        let outcome = self.health.heal(amount);
        self.notify(outcome, events);
        outcome
    }

    /// Full health, back home, standing still
    pub fn reset(&mut self, events: &mut EventQueue) {
        let outcome = self.health.reset();
        self.pos = self.home;
        self.move_vel = Vec2::ZERO;
        self.impulse = Vec2::ZERO;
        self.notify(outcome, events);
    }

    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if !self.is_dead() {
            self.impulse += impulse;
        }
    }

    /// Integrate intent plus knockback. Dead entities stay put.
    fn step(&mut self, dt: f32, bounds: Option<&WorldBounds>) {
        if self.is_dead() {
            return;
        }

        self.pos += (self.move_vel + self.impulse) * dt;
        self.impulse *= (1.0 - IMPULSE_DAMPING * dt).max(0.0);
        if self.impulse.length_squared() < IMPULSE_EPSILON * IMPULSE_EPSILON {
            self.impulse = Vec2::ZERO;
        }

        if let Some(b) = bounds {
            let clamped = b.clamp(self.pos);
            // Kill velocity pushing into the wall
            if clamped.x != self.pos.x {
                self.move_vel.x = 0.0;
                self.impulse.x = 0.0;
            }
            if clamped.y != self.pos.y {
                self.move_vel.y = 0.0;
                self.impulse.y = 0.0;
            }
            self.pos = clamped;
        }
    }

    fn notify(&self, outcome: HealthOutcome, events: &mut EventQueue) {
        match outcome {
            HealthOutcome::Ignored => {}
            HealthOutcome::Changed(health) => events.push(GameEvent::HealthChanged {
                entity: self.id,
                health,
            }),
            HealthOutcome::Died => {
                events.push(GameEvent::HealthChanged {
                    entity: self.id,
                    health: 0,
                });
                events.push(GameEvent::EntityDied { entity: self.id });
                log::info!("Entity {:?} has died", self.id);
            }
        }
    }
}

/// Nearest live entity to `pos` within `within`; ties go to the lower id
pub(crate) fn nearest_live(entities: &[Protectable], pos: Vec2, within: f32) -> Option<EntityId> {
    entities
        .iter()
        .filter(|e| !e.is_dead())
        .map(|e| (e.id, e.pos.distance(pos)))
        .filter(|&(_, d)| d <= within)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(id, _)| id)
}

/// Every protectable and hazard currently in play
#[derive(Debug, Clone)]
pub struct World {
    /// Sorted by id
    entities: Vec<Protectable>,
    /// Sorted by id
    hazards: Vec<Hazard>,
    bounds: Option<WorldBounds>,
    next_id: u32,
    pub events: EventQueue,
}

impl World {
    pub fn new(bounds: Option<WorldBounds>) -> Self {
        Self {
            entities: Vec::new(),
            hazards: Vec::new(),
            bounds,
            next_id: 1,
            events: EventQueue::new(),
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn bounds(&self) -> Option<&WorldBounds> {
        self.bounds.as_ref()
    }

    // --- protectables ---

    pub fn spawn_protectable(&mut self, pos: Vec2, cfg: &HealthConfig) -> Result<EntityId> {
        let health = Health::new(cfg.max_health, cfg.invincibility)?;
        let id = EntityId(self.next_id());
        self.entities.push(Protectable {
            id,
            pos,
            home: pos,
            move_vel: Vec2::ZERO,
            impulse: Vec2::ZERO,
            radius: cfg.body_radius,
            health,
        });
        self.events.push(GameEvent::HealthChanged {
            entity: id,
            health: cfg.max_health,
        });
        Ok(id)
    }

    pub fn remove_protectable(&mut self, id: EntityId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| e.id != id);
        before != self.entities.len()
    }

    pub fn protectables(&self) -> &[Protectable] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Protectable> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entities[i])
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Protectable> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &mut self.entities[i])
    }

    pub fn live_count(&self) -> usize {
        self.entities.iter().filter(|e| !e.is_dead()).count()
    }

    pub fn nearest_entity_to(&self, pos: Vec2, within: f32) -> Option<EntityId> {
        nearest_live(&self.entities, pos, within)
    }

    /// Missing entities are ignored
    pub fn damage_entity(&mut self, id: EntityId, amount: u32) -> HealthOutcome {
        let Self {
            entities, events, ..
        } = self;
        match entities.binary_search_by_key(&id, |e| e.id) {
            Ok(i) => entities[i].take_damage(amount, events),
            Err(_) => HealthOutcome::Ignored,
        }
    }

    pub fn heal_entity(&mut self, id: EntityId, amount: u32) -> HealthOutcome {
        let Self {
            entities, events, ..
        } = self;
        match entities.binary_search_by_key(&id, |e| e.id) {
            Ok(i) => entities[i].heal(amount, events),
            Err(_) => HealthOutcome::Ignored,
        }
    }

    /// Returns false when the entity no longer exists
    pub fn set_max_health(&mut self, id: EntityId, max: u32) -> Result<bool> {
        let Self {
            entities, events, ..
        } = self;
        let Ok(i) = entities.binary_search_by_key(&id, |e| e.id) else {
            return Ok(false);
        };
        let entity = &mut entities[i];
        let outcome = entity.health.set_max_health(max)?;
        entity.notify(outcome, events);
        Ok(true)
    }

    pub fn set_velocity(&mut self, id: EntityId, vel: Vec2) -> bool {
        match self.entity_mut(id) {
            Some(e) => {
                e.move_vel = vel;
                true
            }
            None => false,
        }
    }

    pub fn apply_impulse(&mut self, id: EntityId, impulse: Vec2) -> bool {
        match self.entity_mut(id) {
            Some(e) => {
                e.apply_impulse(impulse);
                true
            }
            None => false,
        }
    }

    /// Restore every entity to full health at its home position
    pub fn reset_entities(&mut self) {
        let Self {
            entities, events, ..
        } = self;
        for entity in entities.iter_mut() {
            entity.reset(events);
        }
    }

    // --- hazards ---

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn hazard(&self, id: HazardId) -> Option<&Hazard> {
        self.hazards
            .binary_search_by_key(&id, |h| h.id)
            .ok()
            .map(|i| &self.hazards[i])
    }

    pub fn hazard_mut(&mut self, id: HazardId) -> Option<&mut Hazard> {
        self.hazards
            .binary_search_by_key(&id, |h| h.id)
            .ok()
            .map(|i| &mut self.hazards[i])
    }

    pub fn contains_hazard(&self, id: HazardId) -> bool {
        self.hazard(id).is_some()
    }

    pub fn spawn_hazard(&mut self, spec: HazardSpec) -> HazardId {
        let id = HazardId(self.next_id());
        let hazard = Hazard::spawn(id, spec);
        log::debug!("Spawned {:?} {:?} at {}", hazard.kind(), id, hazard.pos);
        self.events.push(GameEvent::HazardSpawned {
            hazard: id,
            kind: hazard.kind(),
            pos: hazard.pos,
        });
        self.hazards.push(hazard);
        id
    }

    /// Remove a hazard now. Stale handles return false.
    pub fn despawn_hazard(&mut self, id: HazardId) -> bool {
        match self.hazard_mut(id) {
            Some(h) => {
                h.despawn();
                self.sweep_hazards();
                true
            }
            None => false,
        }
    }

    /// Drop hazards marked for removal, reporting each once
    fn sweep_hazards(&mut self) {
        let events = &mut self.events;
        self.hazards.retain(|h| {
            if h.is_despawned() {
                log::debug!("Despawned {:?} {:?}", h.kind(), h.id);
                events.push(GameEvent::HazardDespawned { hazard: h.id });
                false
            } else {
                true
            }
        });
    }

    // --- per-tick phases ---

    /// Advance invincibility windows and trap cycles before any damage lands
    pub fn advance_timers(&mut self, dt: f32) {
        for entity in &mut self.entities {
            entity.health.tick(dt);
        }
        for hazard in &mut self.hazards {
            hazard.advance_timers(dt);
        }
    }

    pub fn move_entities(&mut self, dt: f32) {
        let bounds = self.bounds;
        for entity in &mut self.entities {
            entity.step(dt, bounds.as_ref());
        }
    }

    /// Hazard behaviour, contact damage and despawn rules
    pub fn update_hazards(&mut self, dt: f32, now: f32) {
        let Self {
            entities,
            hazards,
            bounds,
            events,
            ..
        } = self;

        for hazard in hazards.iter_mut() {
            hazard.update(dt, now, entities, events);
            hazard.resolve_contacts(now, entities, events);
            if let Some(b) = bounds
                && !b.contains(hazard.pos)
            {
                hazard.despawn();
            }
        }

        self.sweep_hazards();
    }
}
