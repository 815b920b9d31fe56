//! Stepped spring used to follow a moving target
//!
//! Complements the closed-form spring in [`crate::processing::easing`]:
//! that one eases between two fixed values, this one chases a target that
//! keeps moving (the cursor path) by integrating
//! F = -k * x - c * v with semi-implicit Euler steps.

use crate::geometry::NormalizedPoint;
use crate::settings::SpringConfig;

/// Longest single integration step; larger dt values are subdivided
const MAX_STEP_SECONDS: f64 = 1.0 / 240.0;

/// 1D spring state tracking position and velocity
#[derive(Debug, Clone, Copy)]
pub struct SpringState {
    pub position: f64,
    pub velocity: f64,
}

impl SpringState {
    pub fn new(initial: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
        }
    }

    /// Advance by `dt` seconds toward `target`
    ///
    /// Non-positive or non-finite `dt` leaves the state untouched, and a
    /// non-positive mass is treated as unit mass.
    pub fn step(&mut self, target: f64, config: &SpringConfig, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let mass = if config.mass > 0.0 { config.mass } else { 1.0 };
        let steps = (dt / MAX_STEP_SECONDS).ceil().max(1.0) as usize;
        let h = dt / steps as f64;

        for _ in 0..steps {
            let displacement = self.position - target;
            let acceleration = (-config.stiffness * displacement - config.damping * self.velocity) / mass;
            self.velocity += acceleration * h;
            self.position += self.velocity * h;
        }
    }

    pub fn is_settled(&self, target: f64, threshold: f64) -> bool {
        (self.position - target).abs() < threshold && self.velocity.abs() < threshold
    }
}

/// Spring following a point in normalized space
#[derive(Debug, Clone, Copy)]
pub struct Spring2D {
    pub x: SpringState,
    pub y: SpringState,
}

impl Spring2D {
    pub fn new(start: NormalizedPoint) -> Self {
        let p = start.to_top_left();
        Self {
            x: SpringState::new(p.x),
            y: SpringState::new(p.y),
        }
    }

    pub fn step(&mut self, target: NormalizedPoint, config: &SpringConfig, dt: f64) {
        let t = target.to_top_left();
        self.x.step(t.x, config, dt);
        self.y.step(t.y, config, dt);
    }

    pub fn position(&self) -> NormalizedPoint {
        NormalizedPoint::new(self.x.position, self.y.position)
    }

    /// Jump to a new position with zero velocity (cursor teleports)
    pub fn reset(&mut self, to: NormalizedPoint) {
        *self = Self::new(to);
    }

    pub fn is_settled(&self, target: NormalizedPoint, threshold: f64) -> bool {
        let t = target.to_top_left();
        self.x.is_settled(t.x, threshold) && self.y.is_settled(t.y, threshold)
    }
}
