//! Zone Survivor headless runner
//!
//! Drives one session with a leader walking a looping route and a ring of
//! protectables, logs every event and prints the outcome.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use serde::Serialize;

use zone_survivor::SimConfig;
use zone_survivor::consts::{MAX_SUBSTEPS, SIM_DT};
use zone_survivor::sim::{GameEvent, GameState, Route, SessionOutcome, TickInput, tick};

/// Headless Zone Survivor session
#[derive(Parser, Debug)]
#[command(name = "zone-survivor")]
#[command(about = "Run one survival session without a front end")]
struct Args {
    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON tuning file; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wall-clock seconds to simulate before giving up
    #[arg(long, default_value_t = 180.0)]
    seconds: f32,

    /// Number of protectable entities
    #[arg(long, default_value_t = 5)]
    npcs: u32,

    /// Radius of the ring the entities start on
    #[arg(long, default_value_t = 2.0)]
    spread: f32,

    /// Frame length fed to the fixed-step accumulator
    #[arg(long, default_value_t = 1.0 / 30.0)]
    frame: f32,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    outcome: Option<SessionOutcome>,
    elapsed: f32,
    survivors: usize,
    saved: u32,
    hazards_spawned: u32,
    deaths: u32,
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            SimConfig::from_json(&json).with_context(|| format!("loading {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;
    let seed = config.seed;

    let mut state = GameState::new(config).context("invalid configuration")?;
    for i in 0..args.npcs {
        let angle = i as f32 / args.npcs.max(1) as f32 * std::f32::consts::TAU;
        state.add_protectable(Vec2::from_angle(angle) * args.spread)?;
    }
    state.set_leader_route(Some(Route::new(
        vec![
            Vec2::new(0.0, 30.0),
            Vec2::new(4.0, 60.0),
            Vec2::new(-4.0, 90.0),
            Vec2::ZERO,
        ],
        3.0,
        true,
    )));

    let mut summary = Summary {
        seed,
        outcome: None,
        elapsed: 0.0,
        survivors: 0,
        saved: 0,
        hazards_spawned: 0,
        deaths: 0,
    };

    let mut input = TickInput {
        start: true,
        ..Default::default()
    };
    let frame = args.frame.clamp(SIM_DT, 0.1);
    let mut accumulator = 0.0;
    let mut wall = 0.0;

    while wall < args.seconds && !state.phase().is_finished() {
        wall += frame;
        accumulator += frame;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            // Herd the entities after the leader so the zone is survivable
            input.moves = state
                .world
                .protectables()
                .iter()
                .filter(|e| !e.is_dead())
                .map(|e| {
                    let to_leader = state.leader.pos - e.pos;
                    (e.id, to_leader.clamp_length_max(3.0))
                })
                .collect();

            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            // One-shot inputs
            input.start = false;
        }

        for event in state.world.events.drain() {
            match &event {
                GameEvent::HazardSpawned { .. } => summary.hazards_spawned += 1,
                GameEvent::EntityDied { .. } => summary.deaths += 1,
                _ => {}
            }
            log::debug!("{:?}", event);
        }
    }

    summary.outcome = state.session.outcome();
    summary.elapsed = state.session.elapsed();
    summary.survivors = state.world.live_count();
    summary.saved = state.session.saved();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Seed:      {}", summary.seed);
        println!("Outcome:   {:?}", summary.outcome);
        println!("Elapsed:   {:.1}s", summary.elapsed);
        println!("Survivors: {}/{}", summary.survivors, args.npcs);
        println!("Deaths:    {}", summary.deaths);
        println!("Hazards:   {}", summary.hazards_spawned);
    }
    Ok(())
}
