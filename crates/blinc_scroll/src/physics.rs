//! Scroll physics
//!
//! A [`ScrollPhysics`] is an immutable chain of [`PhysicsPolicy`] objects.
//! Every query starts at the outermost policy; a policy either answers it or
//! defers to its parent, and the root falls back to the defaults in
//! [`crate::config`].
//!
//! ```
//! use blinc_scroll::ScrollPhysics;
//!
//! let physics = ScrollPhysics::always_scrollable().apply_to(Some(&ScrollPhysics::bouncing()));
//! assert_eq!(physics.to_string(), "AlwaysScrollableScrollPhysics -> BouncingScrollPhysics");
//! ```

use std::fmt;
use std::sync::Arc;

use blinc_animation::{ScrollSpringSimulation, Simulation, SpringConfig, Tolerance};

use crate::config::{
    default_spring, BouncingConfig, ClampingConfig, DEFAULT_TOLERANCE, MAX_FLING_VELOCITY,
    MIN_FLING_VELOCITY, TOUCH_SLOP,
};
use crate::error::{Result, ScrollError};
use crate::metrics::{sign, ScrollMetrics};
use crate::simulation::{BouncingScrollSimulation, ClampingScrollSimulation};

/// Identifies a policy in a chain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhysicsKind {
    /// Defers everything to its parent
    Base,
    Bouncing,
    Clamping,
    AlwaysScrollable,
    NeverScrollable,
    /// A policy defined outside this crate
    Custom(&'static str),
}

impl fmt::Display for PhysicsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsKind::Base => write!(f, "ScrollPhysics"),
            PhysicsKind::Bouncing => write!(f, "BouncingScrollPhysics"),
            PhysicsKind::Clamping => write!(f, "ClampingScrollPhysics"),
            PhysicsKind::AlwaysScrollable => write!(f, "AlwaysScrollableScrollPhysics"),
            PhysicsKind::NeverScrollable => write!(f, "NeverScrollableScrollPhysics"),
            PhysicsKind::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// One link of a physics chain.
///
/// Every method receives the chain node it is evaluated for, so a policy can
/// consult the rest of the chain (`physics.tolerance()`) or its parent
/// (`physics.parent()`). The provided implementations defer to the parent
/// and fall back to the defaults at the root.
pub trait PhysicsPolicy: Send + Sync + fmt::Debug {
    fn kind(&self) -> PhysicsKind;

    /// Damp a user drag delta
    fn apply_physics_to_user_offset(
        &self,
        physics: &ScrollPhysics,
        metrics: &ScrollMetrics,
        offset: f64,
    ) -> f64 {
        match physics.parent() {
            Some(parent) => parent.apply_physics_to_user_offset(metrics, offset),
            None => offset,
        }
    }

    fn should_accept_user_offset(&self, physics: &ScrollPhysics, metrics: &ScrollMetrics) -> bool {
        match physics.parent() {
            Some(parent) => parent.should_accept_user_offset(metrics),
            None => metrics.pixels != 0.0 || metrics.min_scroll_extent != metrics.max_scroll_extent,
        }
    }

    /// Overscroll for a move to `value`: the part of the move to refuse
    fn apply_boundary_conditions(
        &self,
        physics: &ScrollPhysics,
        metrics: &ScrollMetrics,
        value: f64,
    ) -> Result<f64> {
        match physics.parent() {
            Some(parent) => parent.apply_boundary_conditions(metrics, value),
            None => Ok(0.0),
        }
    }

    /// Motion after the user lets go, if any
    fn create_ballistic_simulation(
        &self,
        physics: &ScrollPhysics,
        metrics: &ScrollMetrics,
        velocity: f64,
    ) -> Option<Box<dyn Simulation>> {
        physics
            .parent()
            .and_then(|parent| parent.create_ballistic_simulation(metrics, velocity))
    }

    fn spring(&self, physics: &ScrollPhysics) -> SpringConfig {
        physics.parent().map_or_else(default_spring, ScrollPhysics::spring)
    }

    fn tolerance(&self, physics: &ScrollPhysics) -> Tolerance {
        physics
            .parent()
            .map_or(DEFAULT_TOLERANCE, ScrollPhysics::tolerance)
    }

    fn min_fling_distance(&self, physics: &ScrollPhysics) -> f64 {
        physics
            .parent()
            .map_or(TOUCH_SLOP, ScrollPhysics::min_fling_distance)
    }

    fn min_fling_velocity(&self, physics: &ScrollPhysics) -> f64 {
        physics
            .parent()
            .map_or(MIN_FLING_VELOCITY, ScrollPhysics::min_fling_velocity)
    }

    fn max_fling_velocity(&self, physics: &ScrollPhysics) -> f64 {
        physics
            .parent()
            .map_or(MAX_FLING_VELOCITY, ScrollPhysics::max_fling_velocity)
    }

    /// Velocity a new drag inherits from a fling it interrupted
    fn carried_momentum(&self, physics: &ScrollPhysics, existing_velocity: f64) -> f64 {
        physics
            .parent()
            .map_or(0.0, |parent| parent.carried_momentum(existing_velocity))
    }

    /// Distance a drag resumed from rest must cover before it moves content
    fn drag_start_distance_motion_threshold(&self, physics: &ScrollPhysics) -> Option<f64> {
        physics
            .parent()
            .and_then(ScrollPhysics::drag_start_distance_motion_threshold)
    }

    fn allow_implicit_scrolling(&self, physics: &ScrollPhysics) -> bool {
        physics
            .parent()
            .map_or(true, ScrollPhysics::allow_implicit_scrolling)
    }
}

/// A chain of physics policies
#[derive(Clone)]
pub struct ScrollPhysics {
    policy: Arc<dyn PhysicsPolicy>,
    parent: Option<Arc<ScrollPhysics>>,
}

impl ScrollPhysics {
    pub fn new(policy: impl PhysicsPolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
            parent: None,
        }
    }

    /// Physics that only defers to its parent
    pub fn base() -> Self {
        Self::new(BasePolicy)
    }

    pub fn bouncing() -> Self {
        Self::bouncing_with(BouncingConfig::default())
    }

    pub fn bouncing_with(config: BouncingConfig) -> Self {
        Self::new(BouncingPolicy { config })
    }

    pub fn clamping() -> Self {
        Self::clamping_with(ClampingConfig::default())
    }

    pub fn clamping_with(config: ClampingConfig) -> Self {
        Self::new(ClampingPolicy { config })
    }

    pub fn always_scrollable() -> Self {
        Self::new(AlwaysScrollablePolicy)
    }

    pub fn never_scrollable() -> Self {
        Self::new(NeverScrollablePolicy)
    }

    /// Replace this link's parent
    pub fn with_parent(mut self, parent: ScrollPhysics) -> Self {
        self.parent = Some(Arc::new(parent));
        self
    }

    /// Rebuild this chain with `ancestor` appended after its innermost link
    pub fn apply_to(&self, ancestor: Option<&ScrollPhysics>) -> ScrollPhysics {
        ScrollPhysics {
            policy: self.policy.clone(),
            parent: self.build_parent(ancestor).map(Arc::new),
        }
    }

    fn build_parent(&self, ancestor: Option<&ScrollPhysics>) -> Option<ScrollPhysics> {
        match &self.parent {
            Some(parent) => Some(parent.apply_to(ancestor)),
            None => ancestor.cloned(),
        }
    }

    pub fn parent(&self) -> Option<&ScrollPhysics> {
        self.parent.as_deref()
    }

    pub fn kind(&self) -> PhysicsKind {
        self.policy.kind()
    }

    /// Whether both chains consist of the same kinds of policy, in order
    pub fn same_chain(&self, other: &ScrollPhysics) -> bool {
        let mut a = Some(self);
        let mut b = Some(other);
        loop {
            match (a, b) {
                (None, None) => return true,
                (Some(x), Some(y)) if x.kind() == y.kind() => {
                    a = x.parent();
                    b = y.parent();
                }
                _ => return false,
            }
        }
    }

    pub fn apply_physics_to_user_offset(&self, metrics: &ScrollMetrics, offset: f64) -> f64 {
        self.policy.apply_physics_to_user_offset(self, metrics, offset)
    }

    pub fn should_accept_user_offset(&self, metrics: &ScrollMetrics) -> bool {
        self.policy.should_accept_user_offset(self, metrics)
    }

    /// Overscroll for a move to `value`.
    ///
    /// Fails if the chain reports more overscroll than the move itself.
    pub fn apply_boundary_conditions(&self, metrics: &ScrollMetrics, value: f64) -> Result<f64> {
        let overscroll = self.policy.apply_boundary_conditions(self, metrics, value)?;
        let delta = value - metrics.pixels;
        if overscroll.abs() > delta.abs() {
            return Err(ScrollError::InvalidOverscroll {
                physics: self.to_string(),
                pixels: metrics.pixels,
                proposed: value,
                delta,
                overscroll,
            });
        }
        Ok(overscroll)
    }

    pub fn create_ballistic_simulation(
        &self,
        metrics: &ScrollMetrics,
        velocity: f64,
    ) -> Option<Box<dyn Simulation>> {
        self.policy.create_ballistic_simulation(self, metrics, velocity)
    }

    pub fn spring(&self) -> SpringConfig {
        self.policy.spring(self)
    }

    pub fn tolerance(&self) -> Tolerance {
        self.policy.tolerance(self)
    }

    pub fn min_fling_distance(&self) -> f64 {
        self.policy.min_fling_distance(self)
    }

    pub fn min_fling_velocity(&self) -> f64 {
        self.policy.min_fling_velocity(self)
    }

    pub fn max_fling_velocity(&self) -> f64 {
        self.policy.max_fling_velocity(self)
    }

    pub fn carried_momentum(&self, existing_velocity: f64) -> f64 {
        self.policy.carried_momentum(self, existing_velocity)
    }

    pub fn drag_start_distance_motion_threshold(&self) -> Option<f64> {
        self.policy.drag_start_distance_motion_threshold(self)
    }

    pub fn allow_implicit_scrolling(&self) -> bool {
        self.policy.allow_implicit_scrolling(self)
    }
}

impl Default for ScrollPhysics {
    fn default() -> Self {
        Self::base()
    }
}

impl fmt::Display for ScrollPhysics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{} -> {}", self.kind(), parent),
            None => write!(f, "{}", self.kind()),
        }
    }
}

impl fmt::Debug for ScrollPhysics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScrollPhysics({self})")
    }
}

#[derive(Debug)]
struct BasePolicy;

impl PhysicsPolicy for BasePolicy {
    fn kind(&self) -> PhysicsKind {
        PhysicsKind::Base
    }
}

/// Rubber-band overscroll that springs back to the extents
#[derive(Debug)]
pub struct BouncingPolicy {
    config: BouncingConfig,
}

impl BouncingPolicy {
    /// Resistance to a drag that is `overscroll_fraction` of a viewport out of range
    pub fn friction_factor(&self, overscroll_fraction: f64) -> f64 {
        self.config.friction_coefficient * (1.0 - overscroll_fraction).powi(2)
    }
}

/// Scale `abs_delta` by `gamma` until it has covered `extent_outside`
/// worth of damped motion, then pass the rest through.
fn apply_friction(extent_outside: f64, mut abs_delta: f64, gamma: f64) -> f64 {
    debug_assert!(abs_delta > 0.0);
    let mut total = 0.0;
    if extent_outside > 0.0 {
        let delta_to_limit = extent_outside / gamma;
        if abs_delta < delta_to_limit {
            return abs_delta * gamma;
        }
        total += extent_outside;
        abs_delta -= delta_to_limit;
    }
    total + abs_delta
}

impl PhysicsPolicy for BouncingPolicy {
    fn kind(&self) -> PhysicsKind {
        PhysicsKind::Bouncing
    }

    fn apply_physics_to_user_offset(
        &self,
        _physics: &ScrollPhysics,
        metrics: &ScrollMetrics,
        offset: f64,
    ) -> f64 {
        debug_assert!(metrics.min_scroll_extent <= metrics.max_scroll_extent);

        if !metrics.out_of_range() || offset == 0.0 {
            return offset;
        }

        let overscroll_past_start = (metrics.min_scroll_extent - metrics.pixels).max(0.0);
        let overscroll_past_end = (metrics.pixels - metrics.max_scroll_extent).max(0.0);
        let overscroll_past = overscroll_past_start.max(overscroll_past_end);
        let easing = (overscroll_past_start > 0.0 && offset < 0.0)
            || (overscroll_past_end > 0.0 && offset > 0.0);

        let friction = if easing {
            // Moving back towards the content
            self.friction_factor((overscroll_past - offset.abs()) / metrics.viewport_dimension)
        } else {
            self.friction_factor(overscroll_past / metrics.viewport_dimension)
        };

        sign(offset) * apply_friction(overscroll_past, offset.abs(), friction)
    }

    fn apply_boundary_conditions(
        &self,
        _physics: &ScrollPhysics,
        _metrics: &ScrollMetrics,
        _value: f64,
    ) -> Result<f64> {
        Ok(0.0)
    }

    fn create_ballistic_simulation(
        &self,
        physics: &ScrollPhysics,
        metrics: &ScrollMetrics,
        velocity: f64,
    ) -> Option<Box<dyn Simulation>> {
        let tolerance = physics.tolerance();
        if velocity.abs() < tolerance.velocity && !metrics.out_of_range() {
            return None;
        }
        Some(Box::new(BouncingScrollSimulation::new(
            metrics.pixels,
            velocity * self.config.fling_velocity_damping,
            metrics.min_scroll_extent,
            metrics.max_scroll_extent,
            physics.spring(),
            tolerance,
            &self.config,
        )))
    }

    fn min_fling_velocity(&self, _physics: &ScrollPhysics) -> f64 {
        MIN_FLING_VELOCITY * self.config.min_fling_velocity_multiplier
    }

    fn carried_momentum(&self, _physics: &ScrollPhysics, existing_velocity: f64) -> f64 {
        let momentum = self.config.momentum_coefficient
            * existing_velocity.abs().powf(self.config.momentum_exponent);
        sign(existing_velocity) * momentum.min(self.config.max_carried_momentum)
    }

    fn drag_start_distance_motion_threshold(&self, _physics: &ScrollPhysics) -> Option<f64> {
        Some(self.config.drag_start_motion_threshold)
    }
}

/// Hard stops at the extents
#[derive(Debug)]
pub struct ClampingPolicy {
    config: ClampingConfig,
}

impl PhysicsPolicy for ClampingPolicy {
    fn kind(&self) -> PhysicsKind {
        PhysicsKind::Clamping
    }

    fn apply_boundary_conditions(
        &self,
        physics: &ScrollPhysics,
        metrics: &ScrollMetrics,
        value: f64,
    ) -> Result<f64> {
        let pixels = metrics.pixels;
        let (min, max) = (metrics.min_scroll_extent, metrics.max_scroll_extent);

        if value == pixels {
            return Err(ScrollError::RedundantBoundaryCheck {
                physics: physics.to_string(),
                value,
            });
        }

        // Already at or past the start, moving further out
        if value < pixels && pixels <= min {
            return Ok(value - pixels);
        }
        // Already at or past the end, moving further out
        if max <= pixels && pixels < value {
            return Ok(value - pixels);
        }
        // Crossing the start from inside
        if value < min && min < pixels {
            return Ok(value - min);
        }
        // Crossing the end from inside
        if pixels < max && max < value {
            return Ok(value - max);
        }
        Ok(0.0)
    }

    fn create_ballistic_simulation(
        &self,
        physics: &ScrollPhysics,
        metrics: &ScrollMetrics,
        velocity: f64,
    ) -> Option<Box<dyn Simulation>> {
        let tolerance = physics.tolerance();

        if metrics.out_of_range() {
            let end = if metrics.pixels > metrics.max_scroll_extent {
                metrics.max_scroll_extent
            } else {
                metrics.min_scroll_extent
            };
            let simulation =
                ScrollSpringSimulation::new(physics.spring(), metrics.pixels, end, velocity.min(0.0))
                    .with_tolerance(tolerance);
            return Some(Box::new(simulation));
        }

        if velocity.abs() < tolerance.velocity {
            return None;
        }
        if velocity > 0.0 && metrics.pixels >= metrics.max_scroll_extent {
            return None;
        }
        if velocity < 0.0 && metrics.pixels <= metrics.min_scroll_extent {
            return None;
        }

        Some(Box::new(ClampingScrollSimulation::new(
            metrics.pixels,
            velocity,
            tolerance,
            &self.config,
        )))
    }
}

/// Accepts user offsets even when the content does not fill the viewport
#[derive(Debug)]
pub struct AlwaysScrollablePolicy;

impl PhysicsPolicy for AlwaysScrollablePolicy {
    fn kind(&self) -> PhysicsKind {
        PhysicsKind::AlwaysScrollable
    }

    fn should_accept_user_offset(&self, _physics: &ScrollPhysics, _metrics: &ScrollMetrics) -> bool {
        true
    }
}

/// Ignores the user; only programmatic scrolling moves the content
#[derive(Debug)]
pub struct NeverScrollablePolicy;

impl PhysicsPolicy for NeverScrollablePolicy {
    fn kind(&self) -> PhysicsKind {
        PhysicsKind::NeverScrollable
    }

    fn should_accept_user_offset(&self, _physics: &ScrollPhysics, _metrics: &ScrollMetrics) -> bool {
        false
    }

    fn allow_implicit_scrolling(&self, _physics: &ScrollPhysics) -> bool {
        false
    }
}
