//! Whole-session runs through the public API

use glam::Vec2;

use zone_survivor::SimConfig;
use zone_survivor::consts::SIM_DT;
use zone_survivor::sim::{
    GameEvent, GameState, HazardKind, SessionOutcome, SessionPhase, TickInput, tick,
};

fn start(state: &mut GameState) {
    tick(
        state,
        &TickInput {
            start: true,
            ..Default::default()
        },
        SIM_DT,
    );
}

#[test]
fn test_loaded_config_drives_a_survival_win() {
    let json = r#"{
        "seed": 11,
        "session": { "survival_seconds": 2.0, "save_target": 99 },
        "spawner": { "enabled": false },
        "road": { "enabled": false }
    }"#;
    let config = SimConfig::from_json(json).unwrap();
    let mut state = GameState::new(config).unwrap();
    state.add_protectable(Vec2::ZERO).unwrap();
    start(&mut state);

    let mut ticks = 0;
    while state.phase() == SessionPhase::Playing {
        tick(&mut state, &TickInput::default(), 0.125);
        ticks += 1;
        assert!(ticks <= 16);
    }
    assert_eq!(ticks, 16);
    assert_eq!(state.session.outcome(), Some(SessionOutcome::Survival));
}

#[test]
fn test_event_order_for_a_lethal_hit() {
    let mut config = SimConfig::default();
    config.spawner.enabled = false;
    config.road.enabled = false;
    config.obstacle.damage = 500;
    let mut state = GameState::new(config).unwrap();
    let id = state.add_protectable(Vec2::ZERO).unwrap();
    start(&mut state);
    state.world.events.clear();

    let hazard = state.spawn_hazard(HazardKind::Obstacle, Vec2::ZERO);
    tick(&mut state, &TickInput::default(), SIM_DT);

    let events: Vec<_> = state.world.events.drain().collect();
    let expected = [
        GameEvent::HazardSpawned {
            hazard,
            kind: HazardKind::Obstacle,
            pos: Vec2::ZERO,
        },
        GameEvent::HealthChanged {
            entity: id,
            health: 0,
        },
        GameEvent::EntityDied { entity: id },
        GameEvent::SessionChanged {
            from: SessionPhase::Playing,
            to: SessionPhase::GameOver,
        },
        GameEvent::SessionEnded {
            outcome: SessionOutcome::AllDead,
        },
    ];
    assert_eq!(events, expected);
}

#[test]
fn test_full_run_keeps_registry_in_sync() {
    let mut config = SimConfig::default();
    config.seed = 2024;
    config.session.survival_seconds = 30.0;
    let mut state = GameState::new(config).unwrap();
    for i in 0..4 {
        state.add_protectable(Vec2::new(i as f32 - 1.5, 0.0)).unwrap();
    }
    start(&mut state);

    let walk = TickInput {
        leader_move: Some(Vec2::new(0.0, 2.0)),
        ..Default::default()
    };
    let mut spawned = 0usize;
    let mut despawned = 0usize;
    for _ in 0..(30 * 60 + 10) {
        tick(&mut state, &walk, SIM_DT);
        for event in state.world.events.drain() {
            match event {
                GameEvent::HazardSpawned { .. } => spawned += 1,
                GameEvent::HazardDespawned { .. } => despawned += 1,
                _ => {}
            }
        }
        if state.phase().is_finished() {
            break;
        }
        for id in state.scheduler.registry() {
            assert!(state.world.contains_hazard(*id));
        }
    }

    assert!(state.phase().is_finished());
    assert!(spawned > 0);
    assert_eq!(spawned - despawned, state.world.hazards().len());

    start(&mut state);
    assert_eq!(state.phase(), SessionPhase::Playing);
    assert_eq!(state.world.live_count(), 4);
    assert_eq!(state.scheduler.active_count(), state.world.hazards().len());
}
