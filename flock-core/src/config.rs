use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Background colour of the page the flock is drawn over.
pub const PAGE_BACKGROUND: &str = "#0d1b2a";

/// Upper bound on `count`; every step compares all pairs of boids.
pub const MAX_COUNT: usize = 10_000;

/// Colour with 8-bit channels and a fractional alpha, written out as CSS `rgba(..)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Tuning for one run of the simulation. Fixed once the flock is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SimulationConfig {
    pub count: usize,
    /// Boids closer than this are neighbours.
    pub visual_range: f64,
    pub speed_limit: f64,
    /// Neighbours closer than this push the boid away.
    pub separation_distance: f64,
    pub separation_factor: f64,
    pub alignment_factor: f64,
    pub cohesion_factor: f64,
    pub mouse_repel_dist: f64,
    pub mouse_repel_force: f64,
    /// Initial velocity components are drawn from `[-spread, spread)`.
    pub initial_velocity_spread: f64,
    pub color: Rgba,
}

impl SimulationConfig {
    /// Slow, dense school: 180 boids drifting at 0.6 px per frame.
    pub fn sea() -> Self {
        Self {
            count: 180,
            visual_range: 100.0,
            speed_limit: 0.6,
            separation_distance: 20.0,
            separation_factor: 0.03,
            alignment_factor: 0.001,
            cohesion_factor: 0.001,
            mouse_repel_dist: 150.0,
            mouse_repel_force: 0.02,
            initial_velocity_spread: 1.0,
            color: Rgba::new(100, 200, 255, 0.6),
        }
    }

    /// Sparser, faster flock with stronger steering.
    pub fn classic() -> Self {
        Self {
            count: 100,
            speed_limit: 1.0,
            separation_factor: 0.05,
            alignment_factor: 0.005,
            cohesion_factor: 0.005,
            mouse_repel_force: 0.05,
            initial_velocity_spread: 2.0,
            ..Self::sea()
        }
    }

    /// Looks up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "sea" => Some(Self::sea()),
            "classic" => Some(Self::classic()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count > MAX_COUNT {
            return Err(ConfigError::Count(self.count));
        }

        let fields = [
            ("visualRange", self.visual_range),
            ("separationDistance", self.separation_distance),
            ("separationFactor", self.separation_factor),
            ("alignmentFactor", self.alignment_factor),
            ("cohesionFactor", self.cohesion_factor),
            ("mouseRepelDist", self.mouse_repel_dist),
            ("mouseRepelForce", self.mouse_repel_force),
            ("initialVelocitySpread", self.initial_velocity_spread),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if !(self.speed_limit.is_finite() && self.speed_limit > 0.0) {
            return Err(ConfigError::SpeedLimit(self.speed_limit));
        }
        if !(0.0..=1.0).contains(&self.color.a) {
            return Err(ConfigError::Alpha(self.color.a));
        }

        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::sea()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("count must be at most {MAX_COUNT}, got {0}")]
    Count(usize),
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("speedLimit must be a positive finite number, got {0}")]
    SpeedLimit(f64),
    #[error("color alpha must be between 0 and 1, got {0}")]
    Alpha(f64),
}
