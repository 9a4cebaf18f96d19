//! Simulations: position and velocity as functions of time

use std::fmt;

use crate::tolerance::Tolerance;

/// A one-dimensional motion model.
///
/// Time is in seconds since the simulation started. Implementations must be
/// pure functions of time so that a simulation can be sampled at arbitrary
/// (non-monotonic) times.
pub trait Simulation: Send + fmt::Debug {
    /// Position at `time`
    fn x(&self, time: f64) -> f64;

    /// Velocity at `time`
    fn dx(&self, time: f64) -> f64;

    /// Whether the simulation has settled at `time`
    fn is_done(&self, time: f64) -> bool;

    /// Tolerance used to decide when the simulation has settled
    fn tolerance(&self) -> Tolerance;
}

impl Simulation for Box<dyn Simulation> {
    fn x(&self, time: f64) -> f64 {
        (**self).x(time)
    }

    fn dx(&self, time: f64) -> f64 {
        (**self).dx(time)
    }

    fn is_done(&self, time: f64) -> bool {
        (**self).is_done(time)
    }

    fn tolerance(&self) -> Tolerance {
        (**self).tolerance()
    }
}
