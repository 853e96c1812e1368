//! Simulation tuning
//!
//! Passed in once at construction and immutable for the session's lifetime.
//! Every group has serde defaults so partial JSON files load cleanly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::sim::{HazardKind, SpawnTable};

/// Protectable entity health tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub max_health: u32,
    /// Seconds of damage immunity after a hit
    pub invincibility: f32,
    /// Body radius used for hazard contact
    pub body_radius: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            invincibility: 0.5,
            body_radius: 0.5,
        }
    }
}

/// Contact damage shared by every hazard kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub damage: u32,
    /// Minimum seconds between two hits by the same hazard (any target)
    pub cooldown: f32,
    /// Contact radius around the hazard position
    pub radius: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            damage: 10,
            cooldown: 1.0,
            radius: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub contact: ContactConfig,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Distance from the spawn point after which the vehicle removes itself
    pub despawn_distance: f32,
    /// Impulse applied to a struck entity, directed away from the vehicle
    pub knockback: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            contact: ContactConfig {
                radius: 1.0,
                ..ContactConfig::default()
            },
            min_speed: 3.0,
            max_speed: 8.0,
            despawn_distance: 20.0,
            knockback: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaserConfig {
    pub contact: ContactConfig,
    pub chase_speed: f32,
    pub detection_radius: f32,
    pub attack_range: f32,
    /// Seconds between proximity attacks (independent of contact cooldown)
    pub attack_cooldown: f32,
    pub attack_damage: u32,
}

impl Default for ChaserConfig {
    fn default() -> Self {
        Self {
            contact: ContactConfig::default(),
            chase_speed: 2.0,
            detection_radius: 10.0,
            attack_range: 2.0,
            attack_cooldown: 2.0,
            attack_damage: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapConfig {
    pub contact: ContactConfig,
    /// Full closed -> open -> closed cycle length
    pub period: f32,
    /// Dwell time while fully open (the only damaging phase)
    pub open_duration: f32,
    /// Length of each of the opening and closing transitions
    pub transition_duration: f32,
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            contact: ContactConfig::default(),
            period: 3.5,
            open_duration: 1.5,
            transition_duration: 0.5,
        }
    }
}

impl TrapConfig {
    /// Time spent fully closed each cycle
    pub fn closed_duration(&self) -> f32 {
        (self.period - self.open_duration - 2.0 * self.transition_duration).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub radius: f32,
    pub damage_per_second: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            damage_per_second: 2.0,
        }
    }
}

/// Timed random spawner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub enabled: bool,
    /// Seconds between spawn attempts (misses included)
    pub interval: f32,
    /// Half-size of the spawn rectangle centered on the anchor
    pub half_extents: Vec2,
    pub table: SpawnTable,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 3.0,
            half_extents: Vec2::new(10.0, 5.0),
            table: SpawnTable::new(vec![
                (HazardKind::Vehicle, 30),
                (HazardKind::Chaser, 25),
                (HazardKind::Trap, 20),
            ]),
        }
    }
}

/// Segment-based road generator (advances along +y)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    pub enabled: bool,
    pub segment_length: f32,
    /// Spawn a new segment once the anchor is this close to the cursor
    pub lookahead: f32,
    /// Segments starting further than this behind the anchor are dropped
    pub trailing: f32,
    pub initial_segments: u32,
    /// Hazards are placed at x in [-lateral_half_width, lateral_half_width)
    pub lateral_half_width: f32,
    pub min_hazards: u32,
    pub max_hazards: u32,
    pub table: SpawnTable,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            segment_length: 20.0,
            lookahead: 50.0,
            trailing: 30.0,
            initial_segments: 3,
            lateral_half_width: 5.0,
            min_hazards: 1,
            max_hazards: 3,
            table: SpawnTable::new(vec![(HazardKind::Vehicle, 40), (HazardKind::Chaser, 30)])
                .with_fallback(HazardKind::Trap),
        }
    }
}

/// Win conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub survival_seconds: f32,
    pub save_target: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            survival_seconds: 120.0,
            save_target: 10,
        }
    }
}

/// Axis-aligned playfield rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Complete simulation tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Run seed for reproducibility
    pub seed: u64,
    pub health: HealthConfig,
    pub obstacle: ContactConfig,
    pub vehicle: VehicleConfig,
    pub chaser: ChaserConfig,
    pub trap: TrapConfig,
    pub zone: ZoneConfig,
    pub spawner: SpawnerConfig,
    pub road: RoadConfig,
    pub session: SessionConfig,
    pub bounds: Option<WorldBounds>,
}

fn check(ok: bool, msg: &'static str) -> Result<()> {
    if ok { Ok(()) } else { Err(ConfigError::Invalid(msg)) }
}

fn finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl ContactConfig {
    fn validate(&self) -> Result<()> {
        check(finite(&[self.cooldown, self.radius]), "contact values must be finite")?;
        check(self.cooldown >= 0.0, "contact cooldown must be non-negative")?;
        check(self.radius > 0.0, "contact radius must be positive")
    }
}

impl SimConfig {
    /// Parse JSON and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!("Loaded simulation config (seed {})", config.seed);
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject any parameter the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let h = &self.health;
        check(h.max_health > 0, "max_health must be positive")?;
        check(
            finite(&[h.invincibility, h.body_radius]),
            "health values must be finite",
        )?;
        check(h.invincibility >= 0.0, "invincibility must be non-negative")?;
        check(h.body_radius > 0.0, "body_radius must be positive")?;

        self.obstacle.validate()?;

        let v = &self.vehicle;
        v.contact.validate()?;
        check(
            finite(&[v.min_speed, v.max_speed, v.despawn_distance, v.knockback]),
            "vehicle values must be finite",
        )?;
        check(
            v.min_speed >= 0.0 && v.min_speed <= v.max_speed,
            "vehicle speeds must satisfy 0 <= min_speed <= max_speed",
        )?;
        check(v.despawn_distance > 0.0, "vehicle despawn_distance must be positive")?;
        check(v.knockback >= 0.0, "vehicle knockback must be non-negative")?;

        let c = &self.chaser;
        c.contact.validate()?;
        check(
            finite(&[c.chase_speed, c.detection_radius, c.attack_range, c.attack_cooldown]),
            "chaser values must be finite",
        )?;
        check(c.chase_speed >= 0.0, "chase_speed must be non-negative")?;
        check(c.detection_radius > 0.0, "detection_radius must be positive")?;
        check(c.attack_range >= 0.0, "attack_range must be non-negative")?;
        check(c.attack_cooldown >= 0.0, "attack_cooldown must be non-negative")?;

        let t = &self.trap;
        t.contact.validate()?;
        check(
            finite(&[t.period, t.open_duration, t.transition_duration]),
            "trap timings must be finite",
        )?;
        check(t.period > 0.0, "trap period must be positive")?;
        check(t.open_duration > 0.0, "trap open_duration must be positive")?;
        check(
            t.transition_duration >= 0.0,
            "trap transition_duration must be non-negative",
        )?;
        check(
            t.open_duration + 2.0 * t.transition_duration <= t.period,
            "trap open and transition phases must fit inside the period",
        )?;

        let z = &self.zone;
        check(finite(&[z.radius, z.damage_per_second]), "zone values must be finite")?;
        check(z.radius > 0.0, "zone radius must be positive")?;
        check(z.damage_per_second >= 0.0, "zone damage_per_second must be non-negative")?;

        let s = &self.spawner;
        check(
            s.interval.is_finite() && s.interval > 0.0,
            "spawner interval must be positive",
        )?;
        check(
            s.half_extents.is_finite() && s.half_extents.min_element() >= 0.0,
            "spawner half_extents must be non-negative",
        )?;

        let r = &self.road;
        check(
            finite(&[r.segment_length, r.lookahead, r.trailing, r.lateral_half_width]),
            "road values must be finite",
        )?;
        check(r.segment_length > 0.0, "road segment_length must be positive")?;
        check(r.lookahead >= 0.0, "road lookahead must be non-negative")?;
        check(
            r.trailing >= r.segment_length,
            "road trailing distance must be at least one segment_length",
        )?;
        check(r.lateral_half_width >= 0.0, "road lateral_half_width must be non-negative")?;
        check(
            r.min_hazards <= r.max_hazards,
            "road min_hazards must not exceed max_hazards",
        )?;

        let ses = &self.session;
        check(
            ses.survival_seconds.is_finite() && ses.survival_seconds > 0.0,
            "survival_seconds must be positive",
        )?;
        check(ses.save_target > 0, "save_target must be positive")?;

        if let Some(b) = &self.bounds {
            check(
                b.min.is_finite() && b.max.is_finite() && b.min.cmplt(b.max).all(),
                "bounds min must be strictly below max",
            )?;
        }

        Ok(())
    }
}
