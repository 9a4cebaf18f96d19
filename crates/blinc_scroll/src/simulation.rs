//! Scroll-specific fling simulations
//!
//! [`BouncingScrollSimulation`] lets content coast past its extents and
//! springs it back. [`ClampingScrollSimulation`] follows the fixed
//! deceleration curve of platform flings and is meant to be paired with
//! boundary conditions that stop it at the edges.

use std::fmt;

use blinc_animation::{FrictionSimulation, ScrollSpringSimulation, Simulation, SpringConfig, Tolerance};

use crate::config::{BouncingConfig, ClampingConfig};
use crate::metrics::sign;

#[derive(Clone, Debug)]
enum BouncePhases {
    /// Released out of range: spring straight back
    Spring(ScrollSpringSimulation),
    /// Comes to rest in range
    Friction(FrictionSimulation),
    /// Coasts into an extent, then springs back from it
    FrictionThenSpring {
        friction: FrictionSimulation,
        spring: ScrollSpringSimulation,
        spring_time: f64,
    },
}

/// Friction inside the extents, a spring outside them
#[derive(Clone, Debug)]
pub struct BouncingScrollSimulation {
    leading_extent: f64,
    trailing_extent: f64,
    phases: BouncePhases,
    tolerance: Tolerance,
}

impl BouncingScrollSimulation {
    pub fn new(
        position: f64,
        velocity: f64,
        leading_extent: f64,
        trailing_extent: f64,
        spring: SpringConfig,
        tolerance: Tolerance,
        config: &BouncingConfig,
    ) -> Self {
        debug_assert!(leading_extent <= trailing_extent);

        let spring_to = |x: f64, dx: f64, end: f64| {
            ScrollSpringSimulation::new(spring, x, end, dx).with_tolerance(tolerance)
        };
        let cap = config.max_spring_transfer_velocity;

        let phases = if position < leading_extent {
            BouncePhases::Spring(spring_to(position, velocity, leading_extent))
        } else if position > trailing_extent {
            BouncePhases::Spring(spring_to(position, velocity, trailing_extent))
        } else {
            let friction =
                FrictionSimulation::new(config.friction_drag, position, velocity).with_tolerance(tolerance);
            let final_x = friction.final_x();

            let edge = if velocity > 0.0 && final_x > trailing_extent {
                Some(trailing_extent)
            } else if velocity < 0.0 && final_x < leading_extent {
                Some(leading_extent)
            } else {
                None
            };

            match edge {
                Some(edge) => {
                    let spring_time = friction.time_at_x(edge);
                    debug_assert!(spring_time.is_finite());
                    let transfer_velocity = friction.dx(spring_time).clamp(-cap, cap);
                    BouncePhases::FrictionThenSpring {
                        spring: spring_to(edge, transfer_velocity, edge),
                        friction,
                        spring_time,
                    }
                }
                None => BouncePhases::Friction(friction),
            }
        };

        Self {
            leading_extent,
            trailing_extent,
            phases,
            tolerance,
        }
    }

    /// The phase that is active at `time`, and the time it started
    fn phase(&self, time: f64) -> (&dyn Simulation, f64) {
        match &self.phases {
            BouncePhases::Spring(spring) => (spring, 0.0),
            BouncePhases::Friction(friction) => (friction, 0.0),
            BouncePhases::FrictionThenSpring {
                friction,
                spring,
                spring_time,
            } => {
                if time > *spring_time {
                    (spring, *spring_time)
                } else {
                    (friction, 0.0)
                }
            }
        }
    }
}

impl Simulation for BouncingScrollSimulation {
    fn x(&self, time: f64) -> f64 {
        let (simulation, offset) = self.phase(time);
        simulation.x(time - offset)
    }

    fn dx(&self, time: f64) -> f64 {
        let (simulation, offset) = self.phase(time);
        simulation.dx(time - offset)
    }

    fn is_done(&self, time: f64) -> bool {
        let (simulation, offset) = self.phase(time);
        simulation.is_done(time - offset)
    }

    fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}

impl fmt::Display for BouncingScrollSimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BouncingScrollSimulation(leading_extent: {}, trailing_extent: {})",
            self.leading_extent, self.trailing_extent
        )
    }
}

/// Penetration at `t = 0`; the slope of the distance polynomial there
const INITIAL_VELOCITY_PENETRATION: f64 = 3.065;

fn fling_distance_penetration(t: f64) -> f64 {
    (1.2 * t * t * t) - (3.27 * t * t) + (INITIAL_VELOCITY_PENETRATION * t)
}

fn fling_velocity_penetration(t: f64) -> f64 {
    (3.6 * t * t) - (6.54 * t) + INITIAL_VELOCITY_PENETRATION
}

/// Fixed-duration fling with a polynomial deceleration curve
#[derive(Clone, Debug)]
pub struct ClampingScrollSimulation {
    position: f64,
    velocity: f64,
    friction: f64,
    duration: f64,
    distance: f64,
    tolerance: Tolerance,
}

impl ClampingScrollSimulation {
    pub fn new(position: f64, velocity: f64, tolerance: Tolerance, config: &ClampingConfig) -> Self {
        let friction = config.friction;
        let duration = fling_duration(friction, velocity);
        Self {
            position,
            velocity,
            friction,
            duration,
            distance: (velocity * duration / INITIAL_VELOCITY_PENETRATION).abs(),
            tolerance,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }
}

fn fling_duration(friction: f64, velocity: f64) -> f64 {
    let deceleration_rate = 0.78_f64.ln() / 0.9_f64.ln();
    // Deceleration for a physical coefficient of 0.84
    let scaled_friction = friction * (0.84 * 61774.04968);
    let deceleration = (0.35 * velocity.abs() / scaled_friction).ln();
    (deceleration / (deceleration_rate - 1.0)).exp()
}

impl Simulation for ClampingScrollSimulation {
    fn x(&self, time: f64) -> f64 {
        let t = (time / self.duration).clamp(0.0, 1.0);
        self.position + self.distance * fling_distance_penetration(t) * sign(self.velocity)
    }

    fn dx(&self, time: f64) -> f64 {
        let t = (time / self.duration).clamp(0.0, 1.0);
        self.distance * fling_velocity_penetration(t) * sign(self.velocity) / self.duration
    }

    fn is_done(&self, time: f64) -> bool {
        time >= self.duration
    }

    fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_spring, DEFAULT_TOLERANCE};

    fn bouncing(position: f64, velocity: f64) -> BouncingScrollSimulation {
        BouncingScrollSimulation::new(
            position,
            velocity,
            0.0,
            1000.0,
            default_spring(),
            DEFAULT_TOLERANCE,
            &BouncingConfig::default(),
        )
    }

    fn settle(simulation: &dyn Simulation) -> f64 {
        let mut t = 0.0;
        while !simulation.is_done(t) {
            t += 1.0 / 60.0;
            assert!(t < 30.0, "simulation never settled");
        }
        simulation.x(t)
    }

    #[test]
    fn test_bouncing_coasts_inside_extents() {
        let sim = bouncing(100.0, 200.0);
        assert!(matches!(sim.phases, BouncePhases::Friction(_)));
        let rest = settle(&sim);
        assert!(rest > 100.0 && rest < 1000.0);
    }

    #[test]
    fn test_bouncing_fling_past_end_springs_back() {
        let sim = bouncing(900.0, 3000.0);
        let BouncePhases::FrictionThenSpring { spring_time, .. } = sim.phases else {
            panic!("expected a friction phase handing off to a spring");
        };
        assert!((sim.x(spring_time) - 1000.0).abs() < 1e-6);
        assert!(sim.x(spring_time + 0.05) > 1000.0);
        assert_eq!(settle(&sim), 1000.0);
    }

    #[test]
    fn test_bouncing_released_out_of_range_returns_to_edge() {
        let sim = bouncing(-80.0, 0.0);
        assert!(matches!(sim.phases, BouncePhases::Spring(_)));
        assert_eq!(settle(&sim), 0.0);
    }

    #[test]
    fn test_bouncing_spring_transfer_velocity_is_capped() {
        let sim = bouncing(999.0, 40000.0);
        let BouncePhases::FrictionThenSpring { spring_time, .. } = sim.phases else {
            panic!("expected a friction phase handing off to a spring");
        };
        assert!(sim.dx(spring_time + 1e-9) <= 5000.0 + 1e-6);
    }

    #[test]
    fn test_clamping_fling_decelerates_to_rest() {
        let sim = ClampingScrollSimulation::new(0.0, 2000.0, DEFAULT_TOLERANCE, &ClampingConfig::default());
        assert!(sim.duration() > 0.0);
        assert!(sim.dx(0.0) > 0.0);
        assert!(sim.dx(sim.duration() * 0.5) < sim.dx(0.0));
        assert!(sim.is_done(sim.duration()));
        assert!(!sim.is_done(sim.duration() * 0.5));

        let end = sim.x(sim.duration());
        assert!(end > 0.0);
        assert_eq!(sim.x(sim.duration() * 2.0), end);
    }

    #[test]
    fn test_clamping_fling_follows_velocity_sign() {
        let sim = ClampingScrollSimulation::new(500.0, -1500.0, DEFAULT_TOLERANCE, &ClampingConfig::default());
        assert!(sim.x(sim.duration()) < 500.0);
        assert!(sim.dx(0.0) < 0.0);
    }
}
