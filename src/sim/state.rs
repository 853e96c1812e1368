//! Game state and session context
//!
//! Owns every simulation component. Front ends construct one `GameState`,
//! feed it [`TickInput`](super::TickInput) through [`tick`](super::tick) and
//! drain `world.events`.

use glam::Vec2;

use super::hazard::{HazardId, HazardKind};
use super::leader::{Leader, Route};
use super::session::{Session, SessionPhase};
use super::spawn::SpawnScheduler;
use super::world::{EntityId, World};
use super::zone::ZoneTracker;
use crate::config::SimConfig;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct GameState {
    pub config: SimConfig,
    pub world: World,
    pub zone: ZoneTracker,
    pub scheduler: SpawnScheduler,
    pub session: Session,
    pub leader: Leader,
    /// Simulation clock in seconds; only runs while Playing
    pub time: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Validate the config and build every component. Starts in the menu.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let state = Self {
            world: World::new(config.bounds),
            zone: ZoneTracker::new(&config.zone)?,
            scheduler: SpawnScheduler::new(&config)?,
            session: Session::new(&config.session)?,
            leader: Leader::new(Vec2::ZERO),
            time: 0.0,
            time_ticks: 0,
            config,
        };
        log::info!("Game state created (seed {})", state.config.seed);
        Ok(state)
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Where the zone and spawners are centered
    pub fn anchor(&self) -> Vec2 {
        self.leader.pos
    }

    pub fn add_protectable(&mut self, pos: Vec2) -> Result<EntityId> {
        self.world.spawn_protectable(pos, &self.config.health)
    }

    pub fn set_leader_route(&mut self, route: Option<Route>) {
        self.leader.set_route(route);
    }

    /// Spawn a hazard tracked for cleanup on restart
    pub fn spawn_hazard(&mut self, kind: HazardKind, pos: Vec2) -> HazardId {
        self.scheduler.spawn(kind, pos, &mut self.world)
    }

    pub fn despawn_hazard(&mut self, id: HazardId) -> bool {
        self.world.despawn_hazard(id)
    }

    /// Put every component back to its starting point
    fn reset_run(&mut self) {
        self.scheduler.clear_all(&mut self.world);
        self.world.reset_entities();
        self.leader.reset();
        self.zone.clear();
        self.time = 0.0;
        self.time_ticks = 0;
    }

    /// Start or restart a run from any phase
    pub fn start(&mut self) {
        self.reset_run();
        let population = self.world.live_count();
        self.scheduler
            .start(self.time, self.leader.pos, &mut self.world);
        self.session.start(population, &mut self.world.events);
        log::info!("Run started with {} protectables", population);
    }

    pub fn pause(&mut self) -> bool {
        self.session.pause(&mut self.world.events)
    }

    pub fn resume(&mut self) -> bool {
        self.session.resume(&mut self.world.events)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.session.toggle_pause(&mut self.world.events)
    }

    pub fn return_to_menu(&mut self) {
        self.reset_run();
        self.session.return_to_menu(&mut self.world.events);
    }

    /// An entity reached safety
    pub fn record_saved(&mut self) -> bool {
        self.session.record_saved(&mut self.world.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::GameEvent;

    fn quiet_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.spawner.enabled = false;
        config.road.enabled = false;
        config
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = SimConfig::default();
        config.zone.radius = -1.0;
        assert!(GameState::new(config).is_err());
    }

    #[test]
    fn test_new_starts_in_menu() {
        let state = GameState::new(SimConfig::default()).unwrap();
        assert_eq!(state.phase(), SessionPhase::Menu);
        assert!(state.world.hazards().is_empty());
    }

    #[test]
    fn test_start_lays_road_and_enters_playing() {
        let mut state = GameState::new(SimConfig::default()).unwrap();
        state.add_protectable(Vec2::ZERO).unwrap();
        state.start();
        assert_eq!(state.phase(), SessionPhase::Playing);
        assert_eq!(state.session.initial_population(), 1);
        assert!(!state.world.hazards().is_empty());
        assert_eq!(state.scheduler.active_count(), state.world.hazards().len());
    }

    #[test]
    fn test_start_clears_tracked_hazards() {
        let mut state = GameState::new(quiet_config()).unwrap();
        state.start();
        let id = state.spawn_hazard(HazardKind::Obstacle, Vec2::new(3.0, 0.0));
        assert!(state.world.contains_hazard(id));
        state.world.events.clear();

        state.start();
        assert!(!state.world.contains_hazard(id));
        assert!(state.world.events.iter().any(|e| matches!(
            e,
            GameEvent::HazardDespawned { hazard } if *hazard == id
        )));
    }

    #[test]
    fn test_menu_round_trip() {
        let mut state = GameState::new(quiet_config()).unwrap();
        state.start();
        assert!(state.pause());
        state.return_to_menu();
        assert_eq!(state.phase(), SessionPhase::Menu);
        assert!(!state.resume());
    }
}
