//! Zone Survivor - survival simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (health, hazards, zone, spawning, session)
//! - `config`: Data-driven tuning loaded at construction time
//! - `error`: Configuration errors
//!
//! Rendering, UI panels, camera, shop and raw input mapping live outside this
//! crate. They drive [`sim::tick`] once per frame and drain
//! [`sim::EventQueue`] to observe what happened.

pub mod config;
pub mod error;
pub mod sim;

pub use config::SimConfig;
pub use error::ConfigError;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Weighted spawn rolls are drawn from [0, ROLL_RANGE)
    pub const ROLL_RANGE: u32 = 100;

    /// A route walker counts a waypoint as reached inside this distance
    pub const WAYPOINT_ARRIVE_RADIUS: f32 = 0.1;

    /// Knockback impulse decay rate (fraction lost per second)
    pub const IMPULSE_DAMPING: f32 = 4.0;
    /// Impulses below this length snap to zero
    pub const IMPULSE_EPSILON: f32 = 0.01;
}

/// Step `from` toward `to` by at most `max_step`, never overshooting
#[inline]
pub fn move_toward(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= max_step || dist <= f32::EPSILON {
        to
    } else {
        from + delta / dist * max_step
    }
}

/// Whether two circles overlap (touching counts)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}
