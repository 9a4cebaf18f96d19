//! Unbounded animation controller
//!
//! Runs a [`Simulation`] against a [`Ticker`]. The controller is polled: the
//! host advances the scheduler, then whoever owns the controller calls
//! [`AnimationController::poll`] to read the value for the new frame.

use std::fmt;
use std::time::Duration;

use crate::completion::{Completer, Completion};
use crate::easing::Easing;
use crate::simulation::Simulation;
use crate::ticker::{Ticker, TickerProvider};
use crate::tolerance::Tolerance;

/// How far ahead a simulation is sampled when there is no scheduler to run it
const SETTLE_HORIZON_SECS: f64 = 60.0;

/// Linear-time interpolation shaped by an easing curve
#[derive(Clone, Debug)]
pub struct InterpolationSimulation {
    begin: f64,
    end: f64,
    duration: f64,
    curve: Easing,
    tolerance: Tolerance,
}

impl InterpolationSimulation {
    pub fn new(begin: f64, end: f64, duration: Duration, curve: Easing) -> Self {
        Self {
            begin,
            end,
            duration: duration.as_secs_f64(),
            curve,
            tolerance: Tolerance::DEFAULT,
        }
    }
}

impl Simulation for InterpolationSimulation {
    fn x(&self, time: f64) -> f64 {
        let t = if self.duration > 0.0 {
            (time / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if t == 0.0 {
            self.begin
        } else if t == 1.0 {
            self.end
        } else {
            self.begin + (self.end - self.begin) * self.curve.transform(t)
        }
    }

    fn dx(&self, time: f64) -> f64 {
        let epsilon = self.tolerance.time;
        (self.x(time + epsilon) - self.x(time - epsilon)) / (2.0 * epsilon)
    }

    fn is_done(&self, time: f64) -> bool {
        time > self.duration
    }

    fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}

/// Result of polling a controller for the current frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerFrame {
    pub value: f64,
    /// Velocity after this frame; zero once the simulation is done
    pub velocity: f64,
    pub done: bool,
}

/// Drives a value along a simulation, with no lower or upper bound
pub struct AnimationController {
    label: String,
    ticker: Ticker,
    simulation: Option<Box<dyn Simulation>>,
    value: f64,
    last_elapsed: Option<f64>,
    completer: Option<Completer>,
    /// The ticker could not start; the next poll jumps to the end
    settle_on_poll: bool,
}

impl AnimationController {
    pub fn unbounded(vsync: &dyn TickerProvider, value: f64, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            ticker: vsync.create_ticker(&label),
            label,
            simulation: None,
            value,
            last_elapsed: None,
            completer: None,
            settle_on_poll: false,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn velocity(&self) -> f64 {
        match (&self.simulation, self.last_elapsed) {
            (Some(simulation), Some(elapsed)) => simulation.dx(elapsed),
            _ => 0.0,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.simulation.is_some()
    }

    /// Jump to `value`, stopping any running simulation
    pub fn set_value(&mut self, value: f64) {
        self.stop();
        self.value = value;
    }

    /// Animate from the current value to `target`
    pub fn animate_to(&mut self, target: f64, duration: Duration, curve: Easing) -> Completion {
        if duration.is_zero() || target == self.value {
            self.set_value(target);
            return Completion::resolved();
        }
        let simulation = InterpolationSimulation::new(self.value, target, duration, curve);
        self.animate_with(Box::new(simulation))
    }

    /// Run `simulation` from time zero.
    ///
    /// Any running simulation is stopped first and its completion resolves.
    pub fn animate_with(&mut self, simulation: Box<dyn Simulation>) -> Completion {
        self.stop();

        let completer = Completer::new();
        let completion = completer.completion();
        self.value = simulation.x(0.0);
        self.last_elapsed = Some(0.0);

        if let Err(err) = self.ticker.start() {
            tracing::warn!(label = %self.label, %err, "no scheduler, animation will settle immediately");
            self.settle_on_poll = true;
        }
        tracing::trace!(label = %self.label, ?simulation, "animation started");

        self.simulation = Some(simulation);
        self.completer = Some(completer);
        completion
    }

    /// Sample the simulation at the ticker's elapsed time.
    ///
    /// Returns `None` when nothing is animating. When the simulation reports
    /// done the controller stops and its completion resolves.
    pub fn poll(&mut self) -> Option<ControllerFrame> {
        let simulation = self.simulation.as_ref()?;
        let elapsed = if self.settle_on_poll {
            SETTLE_HORIZON_SECS
        } else {
            self.ticker.elapsed()
        };

        self.last_elapsed = Some(elapsed);
        self.value = simulation.x(elapsed);
        let done = self.settle_on_poll || simulation.is_done(elapsed);

        if done {
            tracing::trace!(label = %self.label, value = self.value, "animation completed");
            self.stop();
        }

        Some(ControllerFrame {
            value: self.value,
            velocity: self.velocity(),
            done,
        })
    }

    /// Stop the running simulation, keeping the current value
    pub fn stop(&mut self) {
        self.simulation = None;
        self.last_elapsed = None;
        self.settle_on_poll = false;
        self.ticker.stop();
        if let Some(completer) = self.completer.take() {
            completer.complete();
        }
    }

    pub fn dispose(mut self) {
        self.stop();
    }
}

impl fmt::Display for AnimationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnimationController({:.3}", self.value)?;
        if !self.is_animating() {
            write!(f, "; paused")?;
        }
        write!(f, "; for {})", self.label)
    }
}

impl fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationController")
            .field("label", &self.label)
            .field("value", &self.value)
            .field("simulation", &self.simulation)
            .field("ticker", &self.ticker)
            .finish()
    }
}
