//! Session state machine
//!
//! Menu -> Playing -> {Paused <-> Playing, GameOver, Win}. GameOver and Win
//! hold until an explicit restart or return to the menu. The session is an
//! ordinary value owned by [`GameState`](super::GameState), never a global.

use serde::{Deserialize, Serialize};

use super::events::{EventQueue, GameEvent};
use crate::config::SessionConfig;
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Menu,
    Playing,
    Paused,
    GameOver,
    Win,
}

impl SessionPhase {
    pub fn is_finished(self) -> bool {
        matches!(self, SessionPhase::GameOver | SessionPhase::Win)
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// Every protectable entity died
    AllDead,
    /// Survived until the time target
    Survival,
    /// Reached the saved-count target
    SavedCount,
}

impl SessionOutcome {
    pub fn is_win(self) -> bool {
        !matches!(self, SessionOutcome::AllDead)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    phase: SessionPhase,
    /// Seconds spent in Playing since the last start
    elapsed: f32,
    saved: u32,
    survival_target: f32,
    save_target: u32,
    /// Live protectables when the run started
    initial_population: usize,
    outcome: Option<SessionOutcome>,
}

impl Session {
    pub fn new(cfg: &SessionConfig) -> Result<Self> {
        if !(cfg.survival_seconds.is_finite() && cfg.survival_seconds > 0.0) {
            return Err(ConfigError::Invalid("survival_seconds must be positive"));
        }
        if cfg.save_target == 0 {
            return Err(ConfigError::Invalid("save_target must be positive"));
        }
        Ok(Self {
            phase: SessionPhase::Menu,
            elapsed: 0.0,
            saved: 0,
            survival_target: cfg.survival_seconds,
            save_target: cfg.save_target,
            initial_population: 0,
            outcome: None,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn saved(&self) -> u32 {
        self.saved
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn initial_population(&self) -> usize {
        self.initial_population
    }

    /// Seconds left before the survival win
    pub fn remaining_time(&self) -> f32 {
        (self.survival_target - self.elapsed).max(0.0)
    }

    fn transition(&mut self, to: SessionPhase, events: &mut EventQueue) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        log::info!("Session {:?} -> {:?}", from, to);
        events.push(GameEvent::SessionChanged { from, to });
    }

    /// Start or restart from any phase with fresh counters
    pub fn start(&mut self, population: usize, events: &mut EventQueue) {
        self.elapsed = 0.0;
        self.saved = 0;
        self.outcome = None;
        self.initial_population = population;
        self.transition(SessionPhase::Playing, events);
    }

    /// Playing -> Paused. Returns false from any other phase.
    pub fn pause(&mut self, events: &mut EventQueue) -> bool {
        if self.phase != SessionPhase::Playing {
            log::warn!("Ignoring pause while {:?}", self.phase);
            return false;
        }
        self.transition(SessionPhase::Paused, events);
        true
    }

    /// Paused -> Playing. Returns false from any other phase.
    pub fn resume(&mut self, events: &mut EventQueue) -> bool {
        if self.phase != SessionPhase::Paused {
            log::warn!("Ignoring resume while {:?}", self.phase);
            return false;
        }
        self.transition(SessionPhase::Playing, events);
        true
    }

    pub fn toggle_pause(&mut self, events: &mut EventQueue) -> bool {
        match self.phase {
            SessionPhase::Playing => self.pause(events),
            SessionPhase::Paused => self.resume(events),
            _ => false,
        }
    }

    pub fn return_to_menu(&mut self, events: &mut EventQueue) {
        self.elapsed = 0.0;
        self.saved = 0;
        self.outcome = None;
        self.initial_population = 0;
        self.transition(SessionPhase::Menu, events);
    }

    /// Count one more saved entity. Only counts while Playing.
    pub fn record_saved(&mut self, events: &mut EventQueue) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.saved += 1;
        events.push(GameEvent::EntitySaved { saved: self.saved });
        true
    }

    /// Accumulate play time; frozen outside Playing
    pub fn advance(&mut self, dt: f32) {
        if self.is_playing() {
            self.elapsed += dt;
        }
    }

    /// Loss is checked before either win condition. At most one transition.
    pub fn evaluate(&mut self, live: usize, events: &mut EventQueue) -> Option<SessionOutcome> {
        if !self.is_playing() {
            return None;
        }

        let outcome = if self.initial_population > 0 && live == 0 {
            SessionOutcome::AllDead
        } else if self.elapsed >= self.survival_target {
            SessionOutcome::Survival
        } else if self.saved >= self.save_target {
            SessionOutcome::SavedCount
        } else {
            return None;
        };

        self.outcome = Some(outcome);
        let to = if outcome.is_win() {
            SessionPhase::Win
        } else {
            SessionPhase::GameOver
        };
        self.transition(to, events);
        events.push(GameEvent::SessionEnded { outcome });
        log::info!(
            "Session ended: {:?} after {:.1}s with {} saved",
            outcome,
            self.elapsed,
            self.saved
        );
        Some(outcome)
    }
}
