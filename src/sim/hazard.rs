//! Hazards: obstacles, vehicles, chasers and cyclic traps
//!
//! One record type carries the shared contact contract (damage, cooldown,
//! active flag); the kind-specific state lives in [`HazardBehavior`] and is
//! dispatched with a `match`.
//!
//! The contact cooldown is shared across targets: after a hazard hits
//! anything it cannot hit anything else until the cooldown elapses.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::EventQueue;
use super::world::{EntityId, Protectable, nearest_live};
use crate::circles_overlap;
use crate::config::{ChaserConfig, ContactConfig, TrapConfig, VehicleConfig};
use crate::move_toward;

/// Handle to a spawned hazard
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HazardId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    /// Static contact damage
    Obstacle,
    /// Drives along one axis, knocks entities back
    Vehicle,
    /// Hunts the nearest live entity
    Chaser,
    /// Opens and closes on a fixed period, damages only while open
    Trap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub origin: Vec2,
    /// Unit direction of travel
    pub direction: Vec2,
    pub speed: f32,
    pub despawn_distance: f32,
    pub knockback: f32,
}

impl Vehicle {
    /// Move one step; true once past the despawn distance
    fn drive(&self, pos: &mut Vec2, dt: f32) -> bool {
        *pos += self.direction * self.speed * dt;
        pos.distance(self.origin) > self.despawn_distance
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chaser {
    pub target: Option<EntityId>,
    pub chase_speed: f32,
    pub detection_radius: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub attack_damage: u32,
    last_attack_at: Option<f32>,
    /// Target inside detection radius this tick
    pub chasing: bool,
}

impl Chaser {
    fn attack_ready(&self, now: f32) -> bool {
        self.last_attack_at
            .is_none_or(|t| now - t >= self.attack_cooldown)
    }

    /// Acquire, chase or attack. Returns true if an attack was delivered.
    fn think(
        &mut self,
        pos: &mut Vec2,
        vel: &mut Vec2,
        dt: f32,
        now: f32,
        entities: &mut [Protectable],
        events: &mut EventQueue,
    ) -> bool {
        let live_target = self
            .target
            .and_then(|id| entities.iter().position(|e| e.id == id && !e.is_dead()));
        let idx = match live_target {
            Some(i) => Some(i),
            None => {
                self.target = nearest_live(entities, *pos, self.detection_radius);
                self.target
                    .and_then(|id| entities.iter().position(|e| e.id == id))
            }
        };

        let Some(idx) = idx else {
            self.chasing = false;
            *vel = Vec2::ZERO;
            return false;
        };

        let target_pos = entities[idx].pos;
        let dist = pos.distance(target_pos);
        if dist > self.detection_radius {
            self.chasing = false;
            *vel = Vec2::ZERO;
            return false;
        }

        self.chasing = true;
        if dist <= self.attack_range {
            *vel = Vec2::ZERO;
            if !self.attack_ready(now) {
                return false;
            }
            self.last_attack_at = Some(now);
            let victim = &mut entities[idx];
            victim.take_damage(self.attack_damage, events);
            log::debug!("Chaser attacked {:?} for {}", victim.id, self.attack_damage);
            true
        } else {
            *vel = (target_pos - *pos).normalize_or_zero() * self.chase_speed;
            *pos = move_toward(*pos, target_pos, self.chase_speed * dt);
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapPhase {
    Closed,
    /// Visual transition, not yet damaging
    Opening,
    Open,
    /// Visual transition, no longer damaging
    Closing,
}

impl TrapPhase {
    fn next(self) -> Self {
        match self {
            TrapPhase::Closed => TrapPhase::Opening,
            TrapPhase::Opening => TrapPhase::Open,
            TrapPhase::Open => TrapPhase::Closing,
            TrapPhase::Closing => TrapPhase::Closed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trap {
    pub phase: TrapPhase,
    /// Seconds left in the current phase
    pub remaining: f32,
    pub open_duration: f32,
    pub transition_duration: f32,
    pub closed_duration: f32,
}

impl Trap {
    pub fn new(cfg: &TrapConfig) -> Self {
        Self {
            phase: TrapPhase::Opening,
            remaining: cfg.transition_duration,
            open_duration: cfg.open_duration,
            transition_duration: cfg.transition_duration,
            closed_duration: cfg.closed_duration(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.phase == TrapPhase::Open
    }

    fn duration(&self, phase: TrapPhase) -> f32 {
        match phase {
            TrapPhase::Closed => self.closed_duration,
            TrapPhase::Opening | TrapPhase::Closing => self.transition_duration,
            TrapPhase::Open => self.open_duration,
        }
    }

    fn period(&self) -> f32 {
        self.closed_duration + self.open_duration + 2.0 * self.transition_duration
    }

    fn advance(&mut self, dt: f32) {
        self.remaining -= dt;
        // Skip whole cycles on huge steps
        let period = self.period();
        if period > 0.0 && self.remaining < -period {
            self.remaining = -((-self.remaining) % period);
        }
        while self.remaining <= 0.0 {
            self.phase = self.phase.next();
            self.remaining += self.duration(self.phase);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HazardBehavior {
    Obstacle,
    Vehicle(Vehicle),
    Chaser(Chaser),
    Trap(Trap),
}

impl HazardBehavior {
    pub fn kind(&self) -> HazardKind {
        match self {
            HazardBehavior::Obstacle => HazardKind::Obstacle,
            HazardBehavior::Vehicle(_) => HazardKind::Vehicle,
            HazardBehavior::Chaser(_) => HazardKind::Chaser,
            HazardBehavior::Trap(_) => HazardKind::Trap,
        }
    }

    /// Kind-specific damage veto
    fn allows_damage(&self) -> bool {
        match self {
            HazardBehavior::Trap(trap) => trap.is_open(),
            _ => true,
        }
    }
}

/// Everything needed to create a hazard, before it gets an id
#[derive(Debug, Clone)]
pub struct HazardSpec {
    pub pos: Vec2,
    pub contact: ContactConfig,
    pub behavior: HazardBehavior,
}

impl HazardSpec {
    pub fn obstacle(pos: Vec2, cfg: &ContactConfig) -> Self {
        Self {
            pos,
            contact: cfg.clone(),
            behavior: HazardBehavior::Obstacle,
        }
    }

    pub fn vehicle(pos: Vec2, cfg: &VehicleConfig, speed: f32, direction: Vec2) -> Self {
        Self {
            pos,
            contact: cfg.contact.clone(),
            behavior: HazardBehavior::Vehicle(Vehicle {
                origin: pos,
                direction: direction.normalize_or_zero(),
                speed,
                despawn_distance: cfg.despawn_distance,
                knockback: cfg.knockback,
            }),
        }
    }

    pub fn chaser(pos: Vec2, cfg: &ChaserConfig) -> Self {
        Self {
            pos,
            contact: cfg.contact.clone(),
            behavior: HazardBehavior::Chaser(Chaser {
                target: None,
                chase_speed: cfg.chase_speed,
                detection_radius: cfg.detection_radius,
                attack_range: cfg.attack_range,
                attack_cooldown: cfg.attack_cooldown,
                attack_damage: cfg.attack_damage,
                last_attack_at: None,
                chasing: false,
            }),
        }
    }

    pub fn trap(pos: Vec2, cfg: &TrapConfig) -> Self {
        Self {
            pos,
            contact: cfg.contact.clone(),
            behavior: HazardBehavior::Trap(Trap::new(cfg)),
        }
    }
}

/// A live hazard in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: HazardId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: u32,
    pub contact_cooldown: f32,
    active: bool,
    /// Shared across every target
    last_damage_at: Option<f32>,
    despawned: bool,
    pub behavior: HazardBehavior,
}

impl Hazard {
    /// Create an active hazard from a spec
    pub fn spawn(id: HazardId, spec: HazardSpec) -> Self {
        Self {
            id,
            pos: spec.pos,
            vel: Vec2::ZERO,
            radius: spec.contact.radius,
            damage: spec.contact.damage,
            contact_cooldown: spec.contact.cooldown,
            active: true,
            last_damage_at: None,
            despawned: false,
            behavior: spec.behavior,
        }
    }

    pub fn kind(&self) -> HazardKind {
        self.behavior.kind()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Inactive hazards never damage; vehicles stop, traps pause mid-cycle
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.vel = Vec2::ZERO;
        }
    }

    pub fn is_despawned(&self) -> bool {
        self.despawned
    }

    /// Mark for removal. Returns false if already marked.
    pub fn despawn(&mut self) -> bool {
        !std::mem::replace(&mut self.despawned, true)
    }

    pub fn last_damage_at(&self) -> Option<f32> {
        self.last_damage_at
    }

    fn cooldown_ready(&self, now: f32) -> bool {
        self.last_damage_at
            .is_none_or(|t| now - t >= self.contact_cooldown)
    }

    /// Active, not vetoed by its kind, and off cooldown
    pub fn can_damage(&self, now: f32) -> bool {
        self.active && !self.despawned && self.behavior.allows_damage() && self.cooldown_ready(now)
    }

    /// Apply contact damage if allowed. Returns true when the hit landed.
    pub fn on_contact(
        &mut self,
        entity: &mut Protectable,
        now: f32,
        events: &mut EventQueue,
    ) -> bool {
        if !self.can_damage(now) {
            return false;
        }

        entity.take_damage(self.damage, events);
        self.last_damage_at = Some(now);
        self.on_hit(entity);
        true
    }

    fn on_hit(&self, entity: &mut Protectable) {
        match &self.behavior {
            HazardBehavior::Vehicle(v) => {
                let away = (entity.pos - self.pos).normalize_or_zero();
                entity.apply_impulse(away * v.knockback);
                log::debug!("Vehicle {:?} hit {:?}", self.id, entity.id);
            }
            HazardBehavior::Chaser(_) => {
                log::debug!("Chaser {:?} is on {:?}", self.id, entity.id);
            }
            HazardBehavior::Obstacle | HazardBehavior::Trap(_) => {
                log::debug!("{:?} hit {:?} for {} damage", self.id, entity.id, self.damage);
            }
        }
    }

    /// Phase timers that must move before damage is resolved
    pub(crate) fn advance_timers(&mut self, dt: f32) {
        if let HazardBehavior::Trap(trap) = &mut self.behavior
            && self.active
        {
            trap.advance(dt);
        }
    }

    /// Movement and AI for one tick
    pub(crate) fn update(
        &mut self,
        dt: f32,
        now: f32,
        entities: &mut [Protectable],
        events: &mut EventQueue,
    ) {
        if self.despawned || !self.active {
            return;
        }

        match &mut self.behavior {
            HazardBehavior::Obstacle | HazardBehavior::Trap(_) => {}
            HazardBehavior::Vehicle(v) => {
                self.vel = v.direction * v.speed;
                if v.drive(&mut self.pos, dt) {
                    self.despawned = true;
                }
            }
            HazardBehavior::Chaser(c) => {
                if c.think(&mut self.pos, &mut self.vel, dt, now, entities, events) {
                    self.last_damage_at = Some(now);
                }
            }
        }
    }

    /// Damage every overlapping live entity the shared cooldown allows
    pub(crate) fn resolve_contacts(
        &mut self,
        now: f32,
        entities: &mut [Protectable],
        events: &mut EventQueue,
    ) {
        for entity in entities.iter_mut() {
            if !self.can_damage(now) {
                break;
            }
            if entity.is_dead() || !circles_overlap(self.pos, self.radius, entity.pos, entity.radius)
            {
                continue;
            }
            self.on_contact(entity, now, events);
        }
    }
}
