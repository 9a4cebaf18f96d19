//! Blinc Animation System
//!
//! The simulation engine behind scrolling and programmatic animation.
//!
//! # Features
//!
//! - **Simulations**: closed-form springs, exponential friction, and eased
//!   interpolation, all sampled as pure functions of time
//! - **Frame clock**: an [`AnimationScheduler`] that advances [`Ticker`]s,
//!   either from the wall clock or by a fixed delta for deterministic tests
//! - **Controllers**: an unbounded [`AnimationController`] that runs a
//!   simulation against a ticker and resolves a [`Completion`] when done
//! - **Leak detection**: [`TickerRegistry`] refuses to be disposed while one
//!   of its tickers is still running

pub mod completion;
pub mod controller;
pub mod easing;
pub mod error;
pub mod friction;
pub mod scheduler;
pub mod simulation;
pub mod spring;
pub mod ticker;
pub mod tolerance;

pub use completion::{Completer, Completion};
pub use controller::{AnimationController, ControllerFrame, InterpolationSimulation};
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use friction::FrictionSimulation;
pub use scheduler::{AnimationScheduler, SchedulerHandle, TickerId};
pub use simulation::Simulation;
pub use spring::{ScrollSpringSimulation, SpringConfig, SpringSimulation, SpringType};
pub use ticker::{Ticker, TickerProvider, TickerRegistry};
pub use tolerance::{near_equal, near_equal_opt, near_zero, Tolerance};
