//! Fixed timestep simulation tick
//!
//! Advances every component once, in a fixed order, while the session is
//! Playing. Timers move before any damage is applied.

use glam::Vec2;

use super::state::GameState;
use super::world::EntityId;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start or restart the run (from any phase)
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Abandon the run and go back to the menu
    pub menu: bool,
    /// Entities that reached safety this tick
    pub saved: u32,
    /// Movement intent per protectable
    pub moves: Vec<(EntityId, Vec2)>,
    /// Manual leader velocity; the route is walked when absent
    pub leader_move: Option<Vec2>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.start {
        state.start();
        return;
    }
    if input.menu {
        state.return_to_menu();
        return;
    }
    if input.pause {
        state.toggle_pause();
    }

    if !state.session.is_playing() {
        return;
    }

    for &(id, vel) in &input.moves {
        state.world.set_velocity(id, vel);
    }
    for _ in 0..input.saved {
        state.record_saved();
    }

    state.time += dt;
    state.time_ticks += 1;
    state.session.advance(dt);

    // Invincibility and trap phases first
    state.world.advance_timers(dt);

    let bounds = state.world.bounds().copied();
    state.leader.step(input.leader_move, dt, bounds.as_ref());
    state.world.move_entities(dt);
    state.world.update_hazards(dt, state.time);

    let anchor = state.leader.pos;
    state.scheduler.tick(state.time, anchor, &mut state.world);
    state.zone.tick(&mut state.world, anchor, dt);

    let live = state.world.live_count();
    state.session.evaluate(live, &mut state.world.events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::consts::SIM_DT;
    use crate::sim::events::GameEvent;
    use crate::sim::hazard::HazardKind;
    use crate::sim::leader::Route;
    use crate::sim::session::{SessionOutcome, SessionPhase};

    fn quiet_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.spawner.enabled = false;
        config.road.enabled = false;
        config
    }

    fn started(config: SimConfig, positions: &[Vec2]) -> (GameState, Vec<EntityId>) {
        let mut state = GameState::new(config).unwrap();
        let ids = positions
            .iter()
            .map(|&p| state.add_protectable(p).unwrap())
            .collect();
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            SIM_DT,
        );
        state.world.events.clear();
        (state, ids)
    }

    fn ended(state: &GameState) -> Vec<SessionOutcome> {
        state
            .world
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::SessionEnded { outcome } => Some(*outcome),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_game_over_on_the_tick_the_last_entity_dies() {
        let mut config = quiet_config();
        config.obstacle.damage = 1000;
        let (mut state, ids) = started(
            config,
            &[Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(20.0, 0.0)],
        );

        state.world.damage_entity(ids[0], 1000);
        state.world.damage_entity(ids[1], 1000);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase(), SessionPhase::Playing);

        state.spawn_hazard(HazardKind::Obstacle, Vec2::new(20.0, 0.0));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase(), SessionPhase::GameOver);
        assert_eq!(ended(&state), vec![SessionOutcome::AllDead]);
    }

    #[test]
    fn test_survival_win() {
        let mut config = quiet_config();
        config.session.survival_seconds = 1.0;
        let (mut state, _) = started(config, &[Vec2::ZERO]);

        for _ in 0..3 {
            tick(&mut state, &TickInput::default(), 0.25);
        }
        assert_eq!(state.phase(), SessionPhase::Playing);
        tick(&mut state, &TickInput::default(), 0.25);
        assert_eq!(state.phase(), SessionPhase::Win);
        assert_eq!(state.session.outcome(), Some(SessionOutcome::Survival));
    }

    #[test]
    fn test_saved_count_win() {
        let mut config = quiet_config();
        config.session.save_target = 2;
        let (mut state, _) = started(config, &[Vec2::ZERO]);
        let save = TickInput {
            saved: 1,
            ..Default::default()
        };

        tick(&mut state, &save, SIM_DT);
        assert_eq!(state.phase(), SessionPhase::Playing);
        tick(&mut state, &save, SIM_DT);
        assert_eq!(state.phase(), SessionPhase::Win);
        assert_eq!(ended(&state), vec![SessionOutcome::SavedCount]);
        assert!(state
            .world
            .events
            .iter()
            .any(|e| *e == GameEvent::EntitySaved { saved: 2 }));
    }

    #[test]
    fn test_both_wins_same_tick_transition_once() {
        let mut config = quiet_config();
        config.session.survival_seconds = 0.5;
        config.session.save_target = 1;
        let (mut state, _) = started(config, &[Vec2::ZERO]);

        let input = TickInput {
            saved: 1,
            ..Default::default()
        };
        tick(&mut state, &input, 0.5);
        tick(&mut state, &input, 0.5);
        assert_eq!(state.phase(), SessionPhase::Win);
        assert_eq!(ended(&state).len(), 1);
        let wins = state
            .world
            .events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::SessionChanged {
                        to: SessionPhase::Win,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(wins, 1);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut config = quiet_config();
        config.session.save_target = 50;
        config.obstacle.damage = 1000;
        let (mut state, ids) = started(config, &[Vec2::ZERO, Vec2::new(1.0, 0.0)]);

        tick(
            &mut state,
            &TickInput {
                saved: 3,
                ..Default::default()
            },
            SIM_DT,
        );
        state.world.damage_entity(ids[0], 1000);
        let trap = state.spawn_hazard(HazardKind::Obstacle, Vec2::new(1.0, 0.0));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase(), SessionPhase::GameOver);

        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.phase(), SessionPhase::Playing);
        assert_eq!(state.session.saved(), 0);
        assert_eq!(state.session.elapsed(), 0.0);
        assert_eq!(state.time, 0.0);
        assert!(!state.world.contains_hazard(trap));
        assert_eq!(state.scheduler.active_count(), 0);
        for id in ids {
            let e = state.world.entity(id).unwrap();
            assert!(!e.is_dead());
            assert_eq!(e.health().current(), 100);
        }
    }

    #[test]
    fn test_pause_freezes_clock() {
        let (mut state, _) = started(quiet_config(), &[Vec2::ZERO]);
        tick(&mut state, &TickInput::default(), SIM_DT);
        let before = state.time;

        let toggle = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &toggle, SIM_DT);
        assert_eq!(state.phase(), SessionPhase::Paused);
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.time, before);

        tick(&mut state, &toggle, SIM_DT);
        assert_eq!(state.phase(), SessionPhase::Playing);
        assert!(state.time > before);
    }

    #[test]
    fn test_moves_and_menu() {
        let (mut state, ids) = started(quiet_config(), &[Vec2::ZERO]);
        tick(
            &mut state,
            &TickInput {
                moves: vec![(ids[0], Vec2::new(6.0, 0.0))],
                ..Default::default()
            },
            0.5,
        );
        assert_eq!(state.world.entity(ids[0]).unwrap().pos, Vec2::new(3.0, 0.0));

        tick(
            &mut state,
            &TickInput {
                menu: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.phase(), SessionPhase::Menu);
        assert_eq!(state.world.entity(ids[0]).unwrap().pos, Vec2::ZERO);
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut config = SimConfig::default();
            config.seed = 99999;
            let (mut state, _) = started(
                config,
                &[Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 2.0)],
            );
            state.set_leader_route(Some(Route::new(
                vec![Vec2::new(0.0, 40.0), Vec2::new(3.0, 80.0)],
                4.0,
                true,
            )));
            for _ in 0..900 {
                tick(&mut state, &TickInput::default(), SIM_DT);
            }
            state
        };

        let a = run();
        let b = run();
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.world.hazards().len(), b.world.hazards().len());
        for (ha, hb) in a.world.hazards().iter().zip(b.world.hazards()) {
            assert_eq!(ha.id, hb.id);
            assert_eq!(ha.pos, hb.pos);
        }
        for (ea, eb) in a.world.protectables().iter().zip(b.world.protectables()) {
            assert_eq!(ea.health().current(), eb.health().current());
        }
        assert_eq!(a.phase(), b.phase());
    }
}
