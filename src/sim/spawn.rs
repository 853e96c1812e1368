//! Procedural hazard spawning
//!
//! Two cooperating schedulers share one factory, one RNG stream and one
//! registry of the hazards they created:
//! - [`RandomSpawner`]: fixed interval, weighted kind roll, uniform position
//!   in a rectangle around the anchor
//! - [`RoadGenerator`]: extends a road ahead of the anchor and seeds every new
//!   segment with hazards

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::hazard::{HazardId, HazardKind, HazardSpec};
use super::road::RoadGenerator;
use super::world::World;
use crate::config::{ChaserConfig, ContactConfig, SimConfig, SpawnerConfig, TrapConfig, VehicleConfig};
use crate::consts::ROLL_RANGE;
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnWeight {
    pub kind: HazardKind,
    /// Percentage points of the [0, 100) roll
    pub weight: u32,
}

/// Cumulative percentage ranges over hazard kinds
///
/// Weights need not sum to 100; rolls past the last range fall through to
/// `fallback`, or spawn nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnTable {
    pub entries: Vec<SpawnWeight>,
    #[serde(default)]
    pub fallback: Option<HazardKind>,
}

impl SpawnTable {
    pub fn new(entries: Vec<(HazardKind, u32)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(kind, weight)| SpawnWeight { kind, weight })
                .collect(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, kind: HazardKind) -> Self {
        self.fallback = Some(kind);
        self
    }

    /// Map a roll in [0, 100) to a kind
    pub fn pick(&self, roll: u32) -> Option<HazardKind> {
        let mut upper = 0u32;
        for entry in &self.entries {
            upper = upper.saturating_add(entry.weight);
            if roll < upper {
                return Some(entry.kind);
            }
        }
        self.fallback
    }

    pub fn roll(&self, rng: &mut Pcg32) -> Option<HazardKind> {
        self.pick(rng.random_range(0..ROLL_RANGE))
    }
}

/// Builds hazard specs from the per-kind tuning
#[derive(Debug, Clone)]
pub struct HazardFactory {
    obstacle: ContactConfig,
    vehicle: VehicleConfig,
    chaser: ChaserConfig,
    trap: TrapConfig,
}

impl HazardFactory {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            obstacle: config.obstacle.clone(),
            vehicle: config.vehicle.clone(),
            chaser: config.chaser.clone(),
            trap: config.trap.clone(),
        }
    }

    /// Spec with randomized vehicle speed and direction
    pub fn build(&self, kind: HazardKind, pos: Vec2, rng: &mut Pcg32) -> HazardSpec {
        match kind {
            HazardKind::Vehicle => {
                let v = &self.vehicle;
                let speed = rng.random_range(v.min_speed..=v.max_speed);
                let direction = if rng.random_bool(0.5) {
                    Vec2::X
                } else {
                    Vec2::NEG_X
                };
                HazardSpec::vehicle(pos, v, speed, direction)
            }
            _ => self.default_spec(kind, pos),
        }
    }

    /// Deterministic spec: vehicles drive left at mid speed
    pub fn default_spec(&self, kind: HazardKind, pos: Vec2) -> HazardSpec {
        match kind {
            HazardKind::Obstacle => HazardSpec::obstacle(pos, &self.obstacle),
            HazardKind::Vehicle => {
                let v = &self.vehicle;
                HazardSpec::vehicle(pos, v, (v.min_speed + v.max_speed) * 0.5, Vec2::NEG_X)
            }
            HazardKind::Chaser => HazardSpec::chaser(pos, &self.chaser),
            HazardKind::Trap => HazardSpec::trap(pos, &self.trap),
        }
    }
}

/// Spawn through the factory and remember the handle
pub(crate) fn spawn_tracked(
    world: &mut World,
    factory: &HazardFactory,
    rng: &mut Pcg32,
    registry: &mut Vec<HazardId>,
    kind: HazardKind,
    pos: Vec2,
) -> HazardId {
    let id = world.spawn_hazard(factory.build(kind, pos, rng));
    registry.push(id);
    id
}

/// Fixed-interval weighted spawner
#[derive(Debug, Clone)]
pub struct RandomSpawner {
    interval: f32,
    half_extents: Vec2,
    table: SpawnTable,
    next_spawn_at: f32,
}

impl RandomSpawner {
    pub fn new(cfg: &SpawnerConfig) -> Result<Self> {
        if !(cfg.interval.is_finite() && cfg.interval > 0.0) {
            return Err(ConfigError::Invalid("spawner interval must be positive"));
        }
        Ok(Self {
            interval: cfg.interval,
            half_extents: cfg.half_extents.max(Vec2::ZERO),
            table: cfg.table.clone(),
            next_spawn_at: cfg.interval,
        })
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn set_interval(&mut self, interval: f32) -> Result<()> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ConfigError::Invalid("spawner interval must be positive"));
        }
        self.interval = interval;
        Ok(())
    }

    pub fn next_spawn_at(&self) -> f32 {
        self.next_spawn_at
    }

    /// First attempt one interval from `now`
    pub fn reset(&mut self, now: f32) {
        self.next_spawn_at = now + self.interval;
    }

    /// Roll once the timer is due. Misses still restart the timer.
    pub fn tick(&mut self, now: f32, anchor: Vec2, rng: &mut Pcg32) -> Option<(HazardKind, Vec2)> {
        if now < self.next_spawn_at {
            return None;
        }
        self.next_spawn_at = now + self.interval;

        let kind = self.table.roll(rng)?;
        let h = self.half_extents;
        let offset = Vec2::new(rng.random_range(-h.x..=h.x), rng.random_range(-h.y..=h.y));
        Some((kind, anchor + offset))
    }
}

/// Owns both spawners and the registry of hazards they created
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    rng: Pcg32,
    factory: HazardFactory,
    spawner: RandomSpawner,
    spawner_enabled: bool,
    road: Option<RoadGenerator>,
    registry: Vec<HazardId>,
}

impl SpawnScheduler {
    pub fn new(config: &SimConfig) -> Result<Self> {
        let road = if config.road.enabled {
            Some(RoadGenerator::new(&config.road)?)
        } else {
            None
        };
        Ok(Self {
            rng: Pcg32::seed_from_u64(config.seed),
            factory: HazardFactory::new(config),
            spawner: RandomSpawner::new(&config.spawner)?,
            spawner_enabled: config.spawner.enabled,
            road,
            registry: Vec::new(),
        })
    }

    pub fn factory(&self) -> &HazardFactory {
        &self.factory
    }

    pub fn spawner(&self) -> &RandomSpawner {
        &self.spawner
    }

    pub fn set_interval(&mut self, interval: f32) -> Result<()> {
        self.spawner.set_interval(interval)
    }

    pub fn road(&self) -> Option<&RoadGenerator> {
        self.road.as_ref()
    }

    /// Handles of tracked hazards still alive after the last prune
    pub fn registry(&self) -> &[HazardId] {
        &self.registry
    }

    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    /// Begin a run: arm the spawn timer and lay the first road segments
    pub fn start(&mut self, now: f32, anchor: Vec2, world: &mut World) {
        self.spawner.reset(now);
        if let Some(road) = &mut self.road {
            road.reset(world, &self.factory, &mut self.rng, &mut self.registry);
            road.tick(anchor.y, world, &self.factory, &mut self.rng, &mut self.registry);
        }
    }

    pub fn tick(&mut self, now: f32, anchor: Vec2, world: &mut World) {
        self.prune(world);

        if self.spawner_enabled
            && let Some((kind, pos)) = self.spawner.tick(now, anchor, &mut self.rng)
        {
            spawn_tracked(world, &self.factory, &mut self.rng, &mut self.registry, kind, pos);
        }

        if let Some(road) = &mut self.road {
            road.tick(anchor.y, world, &self.factory, &mut self.rng, &mut self.registry);
        }
    }

    /// Spawn one tracked hazard outside the timed schedule
    pub fn spawn(&mut self, kind: HazardKind, pos: Vec2, world: &mut World) -> HazardId {
        spawn_tracked(world, &self.factory, &mut self.rng, &mut self.registry, kind, pos)
    }

    /// Forget handles whose hazards are gone
    pub fn prune(&mut self, world: &World) {
        self.registry.retain(|&id| world.contains_hazard(id));
    }

    /// Despawn every tracked hazard and empty the registry
    pub fn clear_all(&mut self, world: &mut World) {
        let count = self.registry.len();
        for id in self.registry.drain(..) {
            world.despawn_hazard(id);
        }
        log::info!("Cleared {} tracked hazards", count);
    }
}
