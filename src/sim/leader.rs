//! The main character the zone and spawners follow
//!
//! The leader is not a protectable entity. It moves by externally supplied
//! velocity, or walks a waypoint route when one is set and no velocity is
//! given this tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::WorldBounds;
use crate::consts::WAYPOINT_ARRIVE_RADIUS;
use crate::move_toward;

/// Constant-speed walk through a list of points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    waypoints: Vec<Vec2>,
    speed: f32,
    looping: bool,
    index: usize,
}

impl Route {
    pub fn new(waypoints: Vec<Vec2>, speed: f32, looping: bool) -> Self {
        Self {
            waypoints,
            speed: speed.max(0.0),
            looping,
            index: 0,
        }
    }

    /// Waypoint currently being walked to
    pub fn target(&self) -> Option<Vec2> {
        self.waypoints.get(self.index).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.waypoints.len()
    }

    pub fn restart(&mut self) {
        self.index = 0;
    }

    /// Step `pos` along the route, returning the new position
    fn walk(&mut self, pos: Vec2, dt: f32) -> Vec2 {
        let Some(target) = self.target() else {
            return pos;
        };

        let next = move_toward(pos, target, self.speed * dt);
        if next.distance(target) <= WAYPOINT_ARRIVE_RADIUS {
            self.index += 1;
            if self.looping && self.index >= self.waypoints.len() {
                self.index = 0;
            }
        }
        next
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leader {
    pub pos: Vec2,
    /// Start position, restored on restart
    pub home: Vec2,
    /// Velocity observed over the last tick
    pub vel: Vec2,
    route: Option<Route>,
}

impl Leader {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            home: pos,
            vel: Vec2::ZERO,
            route: None,
        }
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn set_route(&mut self, route: Option<Route>) {
        self.route = route;
    }

    /// Manual velocity wins over the route for this tick
    pub fn step(&mut self, manual: Option<Vec2>, dt: f32, bounds: Option<&WorldBounds>) {
        let before = self.pos;
        let mut next = match (manual, self.route.as_mut()) {
            (Some(vel), _) => self.pos + vel * dt,
            (None, Some(route)) => route.walk(self.pos, dt),
            (None, None) => self.pos,
        };
        if let Some(b) = bounds {
            next = b.clamp(next);
        }
        self.pos = next;
        self.vel = if dt > 0.0 { (next - before) / dt } else { Vec2::ZERO };
    }

    pub fn reset(&mut self) {
        self.pos = self.home;
        self.vel = Vec2::ZERO;
        if let Some(route) = &mut self.route {
            route.restart();
        }
    }
}
