//! Scroll tuning
//!
//! The numbers here are tuned "feel" constants. They can be overridden from
//! a TOML file, but the defaults are the tuned values and should be changed
//! with care.
//!
//! ```toml
//! [bouncing]
//! friction_coefficient = 0.52
//! fling_velocity_damping = 0.91
//!
//! [drag]
//! motion_stopped_threshold_ms = 50
//! ```

use std::time::Duration;

use blinc_animation::{SpringConfig, Tolerance};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Distance a pointer must travel before a drag is recognized
pub const TOUCH_SLOP: f64 = 18.0;

/// Slowest release velocity that counts as a fling (logical pixels / second)
pub const MIN_FLING_VELOCITY: f64 = 50.0;

/// Fastest fling velocity that will be honored
pub const MAX_FLING_VELOCITY: f64 = 8000.0;

/// Spring used when a physics chain does not specify one
pub fn default_spring() -> SpringConfig {
    SpringConfig::with_damping_ratio(0.5, 100.0, 1.1)
}

/// Tolerance used when a physics chain does not specify one
pub const DEFAULT_TOLERANCE: Tolerance = Tolerance::new(1.0, Tolerance::DEFAULT.time, 1.0 / 0.050);

/// iOS-style overscroll tuning
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BouncingConfig {
    /// Scale of the rubber-band resistance, `k` in `k·(1 - f)²`
    pub friction_coefficient: f64,
    pub momentum_coefficient: f64,
    pub momentum_exponent: f64,
    pub max_carried_momentum: f64,
    /// Fraction of the release velocity handed to the fling simulation
    pub fling_velocity_damping: f64,
    pub drag_start_motion_threshold: f64,
    /// Multiplier applied to [`MIN_FLING_VELOCITY`]
    pub min_fling_velocity_multiplier: f64,
    /// Fraction of velocity kept after one second of free flight
    pub friction_drag: f64,
    /// Cap on the velocity carried from free flight into the edge spring
    pub max_spring_transfer_velocity: f64,
}

impl Default for BouncingConfig {
    fn default() -> Self {
        Self {
            friction_coefficient: 0.52,
            momentum_coefficient: 0.000816,
            momentum_exponent: 1.967,
            max_carried_momentum: 40000.0,
            fling_velocity_damping: 0.91,
            drag_start_motion_threshold: 3.5,
            min_fling_velocity_multiplier: 2.0,
            friction_drag: 0.135,
            max_spring_transfer_velocity: 5000.0,
        }
    }
}

/// Android-style fling tuning
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClampingConfig {
    pub friction: f64,
}

impl Default for ClampingConfig {
    fn default() -> Self {
        Self { friction: 0.015 }
    }
}

/// Drag hysteresis tuning
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct DragConfig {
    /// A pause longer than this drops momentum carried from a previous fling
    #[serde(default = "default_momentum_retain_ms")]
    pub momentum_retain_stationary_threshold_ms: u64,
    /// A pause longer than this re-arms the drag start threshold
    #[serde(default = "default_motion_stopped_ms")]
    pub motion_stopped_threshold_ms: u64,
    /// Deltas larger than this pass through the start threshold untouched
    #[serde(default = "default_big_threshold_break_distance")]
    pub big_threshold_break_distance: f64,
}

fn default_momentum_retain_ms() -> u64 {
    20
}

fn default_motion_stopped_ms() -> u64 {
    50
}

fn default_big_threshold_break_distance() -> f64 {
    24.0
}

impl DragConfig {
    pub fn momentum_retain_stationary_threshold(&self) -> Duration {
        Duration::from_millis(self.momentum_retain_stationary_threshold_ms)
    }

    pub fn motion_stopped_threshold(&self) -> Duration {
        Duration::from_millis(self.motion_stopped_threshold_ms)
    }
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            momentum_retain_stationary_threshold_ms: default_momentum_retain_ms(),
            motion_stopped_threshold_ms: default_motion_stopped_ms(),
            big_threshold_break_distance: default_big_threshold_break_distance(),
        }
    }
}

/// Top-level scroll tuning file
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ScrollConfig {
    #[serde(default)]
    pub bouncing: BouncingConfig,
    #[serde(default)]
    pub clamping: ClampingConfig,
    #[serde(default)]
    pub drag: DragConfig,
}

impl ScrollConfig {
    /// Parse a tuning file; missing tables and keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config = toml::from_str(source)?;
        tracing::debug!(?config, "loaded scroll config");
        Ok(config)
    }
}
