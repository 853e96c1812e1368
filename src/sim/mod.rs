//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod events;
pub mod hazard;
pub mod health;
pub mod leader;
pub mod road;
pub mod session;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;
pub mod zone;

pub use events::{EventQueue, GameEvent};
pub use hazard::{
    Chaser, Hazard, HazardBehavior, HazardId, HazardKind, HazardSpec, Trap, TrapPhase, Vehicle,
};
pub use health::{Health, HealthOutcome};
pub use leader::{Leader, Route};
pub use road::{RoadGenerator, Segment};
pub use session::{Session, SessionOutcome, SessionPhase};
pub use spawn::{HazardFactory, RandomSpawner, SpawnScheduler, SpawnTable, SpawnWeight};
pub use state::GameState;
pub use tick::{TickInput, tick};
pub use world::{EntityId, Protectable, World};
pub use zone::ZoneTracker;
