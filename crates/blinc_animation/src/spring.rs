//! Damped spring simulations
//!
//! Closed-form solutions of `m·x'' + c·x' + k·x = 0`, so a spring can be
//! sampled at any time without stepping.

use std::fmt;

use crate::simulation::Simulation;
use crate::tolerance::{near_zero, Tolerance};

/// Physical description of a spring
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    /// Spring constant (k)
    pub stiffness: f64,
    /// Damping coefficient (c)
    pub damping: f64,
    /// Mass of the attached body (m)
    pub mass: f64,
}

impl SpringConfig {
    pub const fn new(stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Build a spring from a damping ratio instead of a damping coefficient.
    ///
    /// A ratio of 1.0 is critically damped, below 1.0 oscillates, above 1.0
    /// approaches the target without overshoot.
    pub fn with_damping_ratio(mass: f64, stiffness: f64, ratio: f64) -> Self {
        let damping = ratio * 2.0 * (mass * stiffness).sqrt();
        Self::new(stiffness, damping, mass)
    }

    /// Discriminant of the characteristic equation
    fn cmk(&self) -> f64 {
        self.damping * self.damping - 4.0 * self.mass * self.stiffness
    }
}

impl fmt::Display for SpringConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SpringConfig(mass: {:.1}, stiffness: {:.1}, damping: {:.1})",
            self.mass, self.stiffness, self.damping
        )
    }
}

/// The regime a spring solution falls into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpringType {
    CriticallyDamped,
    UnderDamped,
    OverDamped,
}

/// Displacement from the target as a function of time
#[derive(Clone, Copy, Debug)]
enum SpringSolution {
    Critical { r: f64, c1: f64, c2: f64 },
    Over { r1: f64, r2: f64, c1: f64, c2: f64 },
    Under { w: f64, r: f64, c1: f64, c2: f64 },
}

impl SpringSolution {
    fn new(spring: SpringConfig, distance: f64, velocity: f64) -> Self {
        let cmk = spring.cmk();
        let two_m = 2.0 * spring.mass;

        if cmk == 0.0 {
            let r = -spring.damping / two_m;
            SpringSolution::Critical {
                r,
                c1: distance,
                c2: velocity - r * distance,
            }
        } else if cmk > 0.0 {
            let root = cmk.sqrt();
            let r1 = (-spring.damping - root) / two_m;
            let r2 = (-spring.damping + root) / two_m;
            let c2 = (velocity - r1 * distance) / (r2 - r1);
            SpringSolution::Over {
                r1,
                r2,
                c1: distance - c2,
                c2,
            }
        } else {
            let w = (-cmk).sqrt() / two_m;
            let r = -spring.damping / two_m;
            SpringSolution::Under {
                w,
                r,
                c1: distance,
                c2: (velocity - r * distance) / w,
            }
        }
    }

    fn x(&self, t: f64) -> f64 {
        match *self {
            SpringSolution::Critical { r, c1, c2 } => (c1 + c2 * t) * (r * t).exp(),
            SpringSolution::Over { r1, r2, c1, c2 } => c1 * (r1 * t).exp() + c2 * (r2 * t).exp(),
            SpringSolution::Under { w, r, c1, c2 } => {
                (r * t).exp() * (c1 * (w * t).cos() + c2 * (w * t).sin())
            }
        }
    }

    fn dx(&self, t: f64) -> f64 {
        match *self {
            SpringSolution::Critical { r, c1, c2 } => {
                let power = (r * t).exp();
                r * (c1 + c2 * t) * power + c2 * power
            }
            SpringSolution::Over { r1, r2, c1, c2 } => {
                c1 * r1 * (r1 * t).exp() + c2 * r2 * (r2 * t).exp()
            }
            SpringSolution::Under { w, r, c1, c2 } => {
                let power = (r * t).exp();
                let (sine, cosine) = (w * t).sin_cos();
                power * (c2 * w * cosine - c1 * w * sine) + r * power * (c2 * sine + c1 * cosine)
            }
        }
    }

    fn spring_type(&self) -> SpringType {
        match self {
            SpringSolution::Critical { .. } => SpringType::CriticallyDamped,
            SpringSolution::Over { .. } => SpringType::OverDamped,
            SpringSolution::Under { .. } => SpringType::UnderDamped,
        }
    }
}

/// A spring pulling a body from `start` towards `end`
#[derive(Clone, Debug)]
pub struct SpringSimulation {
    end: f64,
    solution: SpringSolution,
    tolerance: Tolerance,
}

impl SpringSimulation {
    pub fn new(spring: SpringConfig, start: f64, end: f64, velocity: f64) -> Self {
        Self {
            end,
            solution: SpringSolution::new(spring, start - end, velocity),
            tolerance: Tolerance::DEFAULT,
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn spring_type(&self) -> SpringType {
        self.solution.spring_type()
    }

    pub fn end(&self) -> f64 {
        self.end
    }
}

impl Simulation for SpringSimulation {
    fn x(&self, time: f64) -> f64 {
        self.end + self.solution.x(time)
    }

    fn dx(&self, time: f64) -> f64 {
        self.solution.dx(time)
    }

    fn is_done(&self, time: f64) -> bool {
        near_zero(self.solution.x(time), self.tolerance.distance)
            && near_zero(self.solution.dx(time), self.tolerance.velocity)
    }

    fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}

/// A spring that reports exactly its end position once settled.
///
/// Scroll offsets should land on the extent, not a hair away from it.
#[derive(Clone, Debug)]
pub struct ScrollSpringSimulation {
    inner: SpringSimulation,
}

impl ScrollSpringSimulation {
    pub fn new(spring: SpringConfig, start: f64, end: f64, velocity: f64) -> Self {
        Self {
            inner: SpringSimulation::new(spring, start, end, velocity),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.inner = self.inner.with_tolerance(tolerance);
        self
    }

    pub fn spring_type(&self) -> SpringType {
        self.inner.spring_type()
    }

    pub fn end(&self) -> f64 {
        self.inner.end
    }
}

impl Simulation for ScrollSpringSimulation {
    fn x(&self, time: f64) -> f64 {
        if self.is_done(time) {
            self.inner.end
        } else {
            self.inner.x(time)
        }
    }

    fn dx(&self, time: f64) -> f64 {
        self.inner.dx(time)
    }

    fn is_done(&self, time: f64) -> bool {
        self.inner.is_done(time)
    }

    fn tolerance(&self) -> Tolerance {
        self.inner.tolerance
    }
}
