//! Segment-based road generation
//!
//! The road runs along +y. A monotonic cursor marks where the next segment
//! starts; segments are laid whenever the anchor comes within `lookahead` of
//! the cursor and dropped once they start more than `trailing` behind it.
//! Dropping a segment only forgets its bookkeeping: the hazards seeded on it
//! keep living until their own despawn rules remove them.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::hazard::HazardId;
use super::spawn::{HazardFactory, SpawnTable, spawn_tracked};
use super::world::World;
use crate::config::RoadConfig;
use crate::error::{ConfigError, Result};

/// One fixed-length stretch of road
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Position index along the road; `start` is `index * length`
    pub index: u64,
    /// Position along the road axis
    pub start: f32,
    pub length: f32,
    /// Hazards seeded when the segment was laid
    pub hazards: Vec<HazardId>,
}

impl Segment {
    pub fn end(&self) -> f32 {
        self.start + self.length
    }

    pub fn contains(&self, along: f32) -> bool {
        along >= self.start && along < self.end()
    }
}

#[derive(Debug, Clone)]
pub struct RoadGenerator {
    segment_length: f32,
    lookahead: f32,
    trailing: f32,
    initial_segments: u32,
    lateral_half_width: f32,
    min_hazards: u32,
    max_hazards: u32,
    table: SpawnTable,
    /// Index of the next segment to lay; the cursor is derived from it
    next_index: u64,
    /// Ordered by index
    segments: Vec<Segment>,
}

impl RoadGenerator {
    pub fn new(cfg: &RoadConfig) -> Result<Self> {
        if !(cfg.segment_length.is_finite() && cfg.segment_length > 0.0) {
            return Err(ConfigError::Invalid("road segment_length must be positive"));
        }
        if !(cfg.trailing >= cfg.segment_length) {
            return Err(ConfigError::Invalid(
                "road trailing distance must be at least one segment_length",
            ));
        }
        if cfg.min_hazards > cfg.max_hazards {
            return Err(ConfigError::Invalid(
                "road min_hazards must not exceed max_hazards",
            ));
        }
        Ok(Self {
            segment_length: cfg.segment_length,
            lookahead: cfg.lookahead.max(0.0),
            trailing: cfg.trailing,
            initial_segments: cfg.initial_segments,
            lateral_half_width: cfg.lateral_half_width.max(0.0),
            min_hazards: cfg.min_hazards,
            max_hazards: cfg.max_hazards,
            table: cfg.table.clone(),
            next_index: 0,
            segments: Vec::new(),
        })
    }

    /// Where the next segment will start
    pub fn cursor(&self) -> f32 {
        self.start_of(self.next_index)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn start_of(&self, index: u64) -> f32 {
        (index as f64 * self.segment_length as f64) as f32
    }

    /// Segment index covering `along`, in f64 so large positions stay exact.
    /// Negative results clamp to 0 and overflow saturates.
    fn index_at(&self, along: f64) -> f64 {
        (along / self.segment_length as f64).max(0.0)
    }

    /// Drop every segment and lay the initial stretch from zero again
    pub fn reset(
        &mut self,
        world: &mut World,
        factory: &HazardFactory,
        rng: &mut Pcg32,
        registry: &mut Vec<HazardId>,
    ) {
        self.segments.clear();
        self.next_index = 0;
        for _ in 0..self.initial_segments {
            self.lay_segment(world, factory, rng, registry);
        }
    }

    pub fn tick(
        &mut self,
        anchor: f32,
        world: &mut World,
        factory: &HazardFactory,
        rng: &mut Pcg32,
        registry: &mut Vec<HazardId>,
    ) {
        if !anchor.is_finite() {
            return;
        }
        let anchor = anchor as f64;

        // First index that survives the trailing cut, and one past the last
        // index inside the lookahead
        let keep_from = self.index_at(anchor - self.trailing as f64).ceil() as u64;
        let lay_until =
            (self.index_at(anchor + self.lookahead as f64).floor() as u64).saturating_add(1);

        // Anything before `keep_from` would be dropped straight away
        if self.next_index < keep_from {
            self.next_index = keep_from;
        }
        while self.next_index < lay_until {
            self.lay_segment(world, factory, rng, registry);
        }

        let before = self.segments.len();
        self.segments.retain(|s| s.index >= keep_from);
        if self.segments.len() != before {
            log::debug!(
                "Dropped {} road segments before index {}",
                before - self.segments.len(),
                keep_from
            );
        }
    }

    fn lay_segment(
        &mut self,
        world: &mut World,
        factory: &HazardFactory,
        rng: &mut Pcg32,
        registry: &mut Vec<HazardId>,
    ) {
        let index = self.next_index;
        let start = self.start_of(index);
        let count = rng.random_range(self.min_hazards..=self.max_hazards);
        let mut hazards = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let x = if self.lateral_half_width > 0.0 {
                rng.random_range(-self.lateral_half_width..self.lateral_half_width)
            } else {
                0.0
            };
            let y = start + rng.random_range(0.0..self.segment_length);
            if let Some(kind) = self.table.roll(rng) {
                let id = spawn_tracked(world, factory, rng, registry, kind, Vec2::new(x, y));
                hazards.push(id);
            }
        }

        log::info!(
            "Road segment {} at {:.1} with {} hazards",
            index,
            start,
            hazards.len()
        );
        self.segments.push(Segment {
            index,
            start,
            length: self.segment_length,
            hazards,
        });
        self.next_index = index.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::HazardKind;
    use rand::SeedableRng;

    fn setup() -> (RoadGenerator, World, HazardFactory, Pcg32, Vec<HazardId>) {
        let config = SimConfig::default();
        (
            RoadGenerator::new(&config.road).unwrap(),
            World::new(None),
            HazardFactory::new(&config),
            Pcg32::seed_from_u64(7),
            Vec::new(),
        )
    }

    fn assert_contiguous(road: &RoadGenerator) {
        for pair in road.segments().windows(2) {
            assert!((pair[1].start - pair[0].end()).abs() < 1e-3);
            assert!(pair[1].start > pair[0].start);
        }
    }

    #[test]
    fn test_reset_lays_initial_segments() {
        let (mut road, mut world, factory, mut rng, mut registry) = setup();
        road.reset(&mut world, &factory, &mut rng, &mut registry);
        assert_eq!(road.segments().len(), 3);
        assert_eq!(road.cursor(), 60.0);
        for s in road.segments() {
            assert!((1..=3).contains(&s.hazards.len()));
        }
        assert_eq!(registry.len(), world.hazards().len());
    }

    #[test]
    fn test_hazards_land_inside_their_segment() {
        let (mut road, mut world, factory, mut rng, mut registry) = setup();
        road.reset(&mut world, &factory, &mut rng, &mut registry);
        for s in road.segments() {
            for id in &s.hazards {
                let h = world.hazard(*id).unwrap();
                assert!(s.contains(h.pos.y));
                assert!(h.pos.x >= -5.0 && h.pos.x < 5.0);
            }
        }
    }

    #[test]
    fn test_segments_follow_anchor_without_gaps() {
        let (mut road, mut world, factory, mut rng, mut registry) = setup();
        road.reset(&mut world, &factory, &mut rng, &mut registry);

        let mut anchor = 0.0;
        while anchor < 500.0 {
            road.tick(anchor, &mut world, &factory, &mut rng, &mut registry);

            assert!(road.cursor() - anchor > 50.0 - 1e-3);
            assert!(road.segments().iter().any(|s| s.contains(anchor)));
            assert_contiguous(&road);
            let oldest = &road.segments()[0];
            assert!(oldest.start >= anchor - 30.0);

            anchor += 0.7;
        }
    }

    #[test]
    fn test_never_lays_same_position_twice() {
        let (mut road, mut world, factory, mut rng, mut registry) = setup();
        road.reset(&mut world, &factory, &mut rng, &mut registry);
        let mut starts = Vec::new();
        let mut seen = 0;
        for step in 0..400 {
            road.tick(step as f32, &mut world, &factory, &mut rng, &mut registry);
            for s in road.segments() {
                if s.index as usize >= seen {
                    starts.push(s.start);
                    seen = s.index as usize + 1;
                }
            }
        }
        let mut dedup = starts.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), starts.len());
    }

    #[test]
    fn test_big_jump_skips_dead_stretch() {
        let (mut road, mut world, factory, mut rng, mut registry) = setup();
        road.reset(&mut world, &factory, &mut rng, &mut registry);
        road.tick(10_000.0, &mut world, &factory, &mut rng, &mut registry);
        assert!(road.segments().iter().any(|s| s.contains(10_000.0)));
        assert!(road.segments().len() <= 6);
        assert_contiguous(&road);
    }

    #[test]
    fn test_far_anchor_lays_bounded_segments() {
        for anchor in [1.0e9f32, 1.0e12] {
            let (mut road, mut world, factory, mut rng, mut registry) = setup();
            road.reset(&mut world, &factory, &mut rng, &mut registry);
            road.tick(anchor, &mut world, &factory, &mut rng, &mut registry);

            let laid = road.segments().len();
            assert!((1..=6).contains(&laid), "{laid} segments at {anchor}");
            for pair in road.segments().windows(2) {
                assert_eq!(pair[1].index, pair[0].index + 1);
            }
            let expected = (anchor as f64 / 20.0).floor() as u64;
            assert!(road.segments().iter().any(|s| s.index == expected));

            // Same anchor again lays nothing new
            let hazards = world.hazards().len();
            road.tick(anchor, &mut world, &factory, &mut rng, &mut registry);
            assert_eq!(road.segments().len(), laid);
            assert_eq!(world.hazards().len(), hazards);
        }
    }

    #[test]
    fn test_non_finite_anchor_is_ignored() {
        let (mut road, mut world, factory, mut rng, mut registry) = setup();
        road.reset(&mut world, &factory, &mut rng, &mut registry);
        road.tick(f32::INFINITY, &mut world, &factory, &mut rng, &mut registry);
        road.tick(f32::NAN, &mut world, &factory, &mut rng, &mut registry);
        assert_eq!(road.segments().len(), 3);
        assert_eq!(road.cursor(), 60.0);
    }

    #[test]
    fn test_dropping_segment_keeps_its_hazards() {
        let (mut road, mut world, factory, mut rng, mut registry) = setup();
        road.reset(&mut world, &factory, &mut rng, &mut registry);
        let first: Vec<_> = road.segments()[0].hazards.clone();
        road.tick(100.0, &mut world, &factory, &mut rng, &mut registry);
        assert!(road.segments().iter().all(|s| s.index != 0));
        for id in first {
            assert!(world.contains_hazard(id));
        }
    }

    #[test]
    fn test_fallback_kind_always_spawns() {
        let mut config = SimConfig::default();
        config.road.table = SpawnTable::new(vec![]).with_fallback(HazardKind::Obstacle);
        config.road.min_hazards = 2;
        config.road.max_hazards = 2;
        let mut road = RoadGenerator::new(&config.road).unwrap();
        let mut world = World::new(None);
        let factory = HazardFactory::new(&config);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut registry = Vec::new();
        road.reset(&mut world, &factory, &mut rng, &mut registry);
        assert_eq!(world.hazards().len(), 6);
        assert!(world.hazards().iter().all(|h| h.kind() == HazardKind::Obstacle));
    }
}
