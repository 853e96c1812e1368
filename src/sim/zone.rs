//! Moving safe zone
//!
//! The anchor copies the leader's position every tick. Live entities outside
//! the radius take `round(damage_per_second * dt)` each tick they stay out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::{EntityId, World};
use crate::config::ZoneConfig;
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneTracker {
    anchor: Vec2,
    radius: f32,
    damage_per_second: f32,
    /// Sorted by id
    inside: Vec<EntityId>,
    /// Sorted by id
    outside: Vec<EntityId>,
}

impl ZoneTracker {
    pub fn new(cfg: &ZoneConfig) -> Result<Self> {
        if !(cfg.radius.is_finite() && cfg.radius > 0.0) {
            return Err(ConfigError::Invalid("zone radius must be positive"));
        }
        if !(cfg.damage_per_second.is_finite() && cfg.damage_per_second >= 0.0) {
            return Err(ConfigError::Invalid(
                "zone damage_per_second must be non-negative",
            ));
        }
        Ok(Self {
            anchor: Vec2::ZERO,
            radius: cfg.radius,
            damage_per_second: cfg.damage_per_second,
            inside: Vec::new(),
            outside: Vec::new(),
        })
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<()> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::Invalid("zone radius must be positive"));
        }
        self.radius = radius;
        Ok(())
    }

    /// Damage applied to each outside entity for a tick of `dt`
    pub fn damage_for(&self, dt: f32) -> u32 {
        (self.damage_per_second * dt).round() as u32
    }

    /// Follow the anchor, reclassify live entities and bleed the ones outside
    pub fn tick(&mut self, world: &mut World, anchor: Vec2, dt: f32) {
        self.anchor = anchor;
        self.inside.clear();
        self.outside.clear();

        let radius_sq = self.radius * self.radius;
        for entity in world.protectables().iter().filter(|e| !e.is_dead()) {
            if entity.pos.distance_squared(anchor) <= radius_sq {
                self.inside.push(entity.id);
            } else {
                self.outside.push(entity.id);
            }
        }

        let damage = self.damage_for(dt);
        if damage == 0 {
            return;
        }
        for &id in &self.outside {
            world.damage_entity(id, damage);
        }
    }

    pub fn is_inside(&self, id: EntityId) -> bool {
        self.inside.binary_search(&id).is_ok()
    }

    pub fn inside_set(&self) -> &[EntityId] {
        &self.inside
    }

    pub fn outside_set(&self) -> &[EntityId] {
        &self.outside
    }

    /// Forget last tick's classification
    pub fn clear(&mut self) {
        self.inside.clear();
        self.outside.clear();
    }
}
