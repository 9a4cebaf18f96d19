//! Exponential friction
//!
//! Velocity decays as `v·drag^t`, so a body released at `position` with
//! `velocity` coasts towards a finite resting point.

use crate::simulation::Simulation;
use crate::tolerance::Tolerance;

/// A body sliding under fluid-like drag
#[derive(Clone, Debug)]
pub struct FrictionSimulation {
    drag: f64,
    drag_log: f64,
    position: f64,
    velocity: f64,
    tolerance: Tolerance,
}

impl FrictionSimulation {
    /// `drag` is the fraction of velocity kept after one second, in `(0, 1)`
    pub fn new(drag: f64, position: f64, velocity: f64) -> Self {
        Self {
            drag,
            drag_log: drag.ln(),
            position,
            velocity,
            tolerance: Tolerance::DEFAULT,
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Where the body comes to rest
    pub fn final_x(&self) -> f64 {
        self.position - self.velocity / self.drag_log
    }

    /// Time at which the body passes `x`, or infinity if it never does
    pub fn time_at_x(&self, x: f64) -> f64 {
        if x == self.position {
            return 0.0;
        }
        let final_x = self.final_x();
        let unreachable = if self.velocity > 0.0 {
            x < self.position || x > final_x
        } else {
            x > self.position || x < final_x
        };
        if self.velocity == 0.0 || unreachable {
            return f64::INFINITY;
        }
        (self.drag_log * (x - self.position) / self.velocity + 1.0).ln() / self.drag_log
    }
}

impl Simulation for FrictionSimulation {
    fn x(&self, time: f64) -> f64 {
        self.position + self.velocity * self.drag.powf(time) / self.drag_log
            - self.velocity / self.drag_log
    }

    fn dx(&self, time: f64) -> f64 {
        self.velocity * self.drag.powf(time)
    }

    fn is_done(&self, time: f64) -> bool {
        self.dx(time).abs() < self.tolerance.velocity
    }

    fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}
