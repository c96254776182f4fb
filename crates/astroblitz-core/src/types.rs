//! Fundamental geometric and simulation types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 2D position in playfield units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    /// Distance to another position.
    pub fn distance_to(&self, other: &Position) -> f32 {
        self.0.distance(other.0)
    }

    /// Heading angle toward another position (radians, 0 = +X, CCW).
    pub fn angle_to(&self, other: &Position) -> f32 {
        (other.0 - self.0).to_angle()
    }
}

/// Axis-aligned rectangle given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    /// Whether a point lies strictly inside the rectangle.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    /// Clamp a point to the rectangle bounds.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(-8.0, -4.0, 8.0, 4.0)
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds, scaled by the time scale.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of the given (already scaled) delta time.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed_secs += dt as f64;
    }
}
