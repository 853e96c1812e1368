//! Per-entity health and death state machine
//!
//! Health only changes through `damage`, `heal`, `reset` and
//! `set_max_health`. Each returns a [`HealthOutcome`] so the owner can emit
//! notifications in the right order (change before death).

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// What a health mutation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthOutcome {
    /// Blocked by death or invincibility; nothing to notify
    Ignored,
    /// Health changed (or was re-reported) to the given value
    Changed(u32),
    /// Health reached zero on this call; notify change then death
    Died,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    current: u32,
    max: u32,
    /// Immunity granted after each accepted hit
    invincibility_duration: f32,
    /// Seconds of immunity remaining
    invincible_for: f32,
    dead: bool,
}

impl Health {
    /// Full health, not invincible, alive
    pub fn new(max: u32, invincibility_duration: f32) -> Result<Self> {
        if max == 0 {
            return Err(ConfigError::Invalid("max_health must be positive"));
        }
        if !(invincibility_duration >= 0.0 && invincibility_duration.is_finite()) {
            return Err(ConfigError::Invalid("invincibility must be non-negative"));
        }
        Ok(Self {
            current: max,
            max,
            invincibility_duration,
            invincible_for: 0.0,
            dead: false,
        })
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_for > 0.0
    }

    pub fn invincible_for(&self) -> f32 {
        self.invincible_for
    }

    /// Health as a 0-1 fraction
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Apply a hit. No-op while dead or invincible.
    pub fn damage(&mut self, amount: u32) -> HealthOutcome {
        if self.dead || self.is_invincible() {
            return HealthOutcome::Ignored;
        }

        self.current = self.current.saturating_sub(amount);
        self.invincible_for = self.invincibility_duration;
        self.check_invariants();

        if self.current == 0 {
            self.dead = true;
            HealthOutcome::Died
        } else {
            HealthOutcome::Changed(self.current)
        }
    }

    /// Restore health up to max. Dead entities stay dead.
    pub fn heal(&mut self, amount: u32) -> HealthOutcome {
        if self.dead {
            return HealthOutcome::Ignored;
        }
        self.current = self.current.saturating_add(amount).min(self.max);
        self.check_invariants();
        HealthOutcome::Changed(self.current)
    }

    /// Count down the invincibility window
    pub fn tick(&mut self, dt: f32) {
        if self.invincible_for > 0.0 {
            self.invincible_for = (self.invincible_for - dt).max(0.0);
        }
    }

    /// Back to full health, alive, no invincibility
    pub fn reset(&mut self) -> HealthOutcome {
        self.current = self.max;
        self.dead = false;
        self.invincible_for = 0.0;
        HealthOutcome::Changed(self.current)
    }

    /// Change the maximum, clamping current health into the new range
    pub fn set_max_health(&mut self, max: u32) -> Result<HealthOutcome> {
        if max == 0 {
            return Err(ConfigError::Invalid("max_health must be positive"));
        }
        self.max = max;
        self.current = self.current.min(max);
        self.check_invariants();
        Ok(HealthOutcome::Changed(self.current))
    }

    #[inline]
    fn check_invariants(&self) {
        debug_assert!(self.current <= self.max, "health above max");
        debug_assert!(!self.dead || self.current == 0, "dead with health left");
    }
}
