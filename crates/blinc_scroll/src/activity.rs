//! Scroll activities
//!
//! An activity is whatever currently drives a scroll position: nothing
//! ([`IdleScrollActivity`]), a pointer resting on the content
//! ([`HoldScrollActivity`]), a drag ([`DragScrollActivity`]), a physics
//! simulation ([`BallisticScrollActivity`]) or a programmatic animation
//! ([`DrivenScrollActivity`]).
//!
//! A position owns exactly one activity. Activities never call back into the
//! position: they answer queries and return an [`ActivityRequest`] that the
//! position performs through [`ScrollActivityDelegate`].

use std::fmt;
use std::time::Duration;

use blinc_animation::{AnimationController, Completion, Easing, Simulation, TickerProvider};
use blinc_core::DragDetails;

use crate::drag::{GestureId, ScrollDragController};
use crate::error::Result;
use crate::metrics::ScrollMetrics;
use crate::notification::ScrollNotification;

/// Called when a hold or drag activity is torn down.
///
/// Runs while the position is being mutated, so it must not lock the
/// position that owns the activity.
pub type CancelCallback = Box<dyn FnOnce() + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Idle,
    Hold,
    Drag,
    Ballistic,
    Driven,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Idle => write!(f, "IdleScrollActivity"),
            ActivityKind::Hold => write!(f, "HoldScrollActivity"),
            ActivityKind::Drag => write!(f, "DragScrollActivity"),
            ActivityKind::Ballistic => write!(f, "BallisticScrollActivity"),
            ActivityKind::Driven => write!(f, "DrivenScrollActivity"),
        }
    }
}

/// What an activity asks its position to do next
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ActivityRequest {
    #[default]
    None,
    GoIdle,
    GoBallistic(f64),
    /// Move to `pixels`. Any overscroll stops the motion and goes idle;
    /// otherwise `then` starts a ballistic activity with that velocity.
    MoveTo { pixels: f64, then: Option<f64> },
    ApplyUserOffset(f64),
    ApplyUserScrollOffset(f64),
}

/// The control surface a position offers to its activities
pub trait ScrollActivityDelegate {
    /// Update the offset, returning the overscroll
    fn set_pixels(&mut self, pixels: f64) -> Result<f64>;

    /// Apply a drag delta, damped by the physics
    fn apply_user_offset(&mut self, delta: f64) -> Result<()>;

    /// Apply a wheel delta, damped by the physics and kept within the extents
    fn apply_user_scroll_offset(&mut self, delta: f64) -> Result<()>;

    fn go_idle(&mut self) -> Result<()>;

    fn go_ballistic(&mut self, velocity: f64) -> Result<()>;

    fn perform(&mut self, request: ActivityRequest) -> Result<()> {
        match request {
            ActivityRequest::None => Ok(()),
            ActivityRequest::GoIdle => self.go_idle(),
            ActivityRequest::GoBallistic(velocity) => self.go_ballistic(velocity),
            ActivityRequest::MoveTo { pixels, then } => {
                if self.set_pixels(pixels)? != 0.0 {
                    return self.go_idle();
                }
                match then {
                    Some(velocity) => self.go_ballistic(velocity),
                    None => Ok(()),
                }
            }
            ActivityRequest::ApplyUserOffset(delta) => self.apply_user_offset(delta),
            ActivityRequest::ApplyUserScrollOffset(delta) => self.apply_user_scroll_offset(delta),
        }
    }
}

pub trait ScrollActivity: Send + fmt::Debug {
    fn kind(&self) -> ActivityKind;

    /// Whether content beneath the scrollable should ignore pointer events
    fn should_ignore_pointer(&self) -> bool;

    /// Whether the position counts as scrolling while this activity runs
    fn is_scrolling(&self) -> bool;

    /// Current velocity in logical pixels per second
    fn velocity(&self) -> f64;

    /// Re-evaluate after the position was handed to a different physics
    fn reset_activity(&mut self) -> ActivityRequest {
        ActivityRequest::None
    }

    /// Re-evaluate after the extents or viewport changed
    fn apply_new_dimensions(&mut self) -> ActivityRequest {
        ActivityRequest::None
    }

    /// Advance to the current frame
    fn tick(&mut self) -> ActivityRequest {
        ActivityRequest::None
    }

    /// Release resources; called exactly once, when the activity is replaced
    fn dispose(self: Box<Self>) {}

    /// Gesture that owns this activity, if any
    fn gesture_id(&self) -> Option<GestureId> {
        None
    }

    fn as_drag_mut(&mut self) -> Option<&mut ScrollDragController> {
        None
    }

    fn start_notification(&self, metrics: ScrollMetrics) -> ScrollNotification {
        ScrollNotification::Start {
            metrics,
            drag_details: None,
        }
    }

    fn update_notification(&self, metrics: ScrollMetrics, scroll_delta: f64) -> ScrollNotification {
        ScrollNotification::Update {
            metrics,
            scroll_delta,
            drag_details: None,
        }
    }

    fn overscroll_notification(&self, metrics: ScrollMetrics, overscroll: f64) -> ScrollNotification {
        ScrollNotification::Overscroll {
            metrics,
            overscroll,
            velocity: 0.0,
            drag_details: None,
        }
    }

    fn end_notification(&self, metrics: ScrollMetrics) -> ScrollNotification {
        ScrollNotification::End {
            metrics,
            drag_details: None,
        }
    }
}

/// Nothing is moving the position
#[derive(Debug, Default)]
pub struct IdleScrollActivity;

impl ScrollActivity for IdleScrollActivity {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Idle
    }

    fn should_ignore_pointer(&self) -> bool {
        false
    }

    fn is_scrolling(&self) -> bool {
        false
    }

    fn velocity(&self) -> f64 {
        0.0
    }

    /// Let the physics correct a position left out of range by the new extents
    fn apply_new_dimensions(&mut self) -> ActivityRequest {
        ActivityRequest::GoBallistic(0.0)
    }
}

/// A pointer is down but has not started dragging
pub struct HoldScrollActivity {
    gesture: GestureId,
    on_hold_canceled: Option<CancelCallback>,
}

impl HoldScrollActivity {
    pub fn new(gesture: GestureId, on_hold_canceled: Option<CancelCallback>) -> Self {
        Self {
            gesture,
            on_hold_canceled,
        }
    }
}

impl ScrollActivity for HoldScrollActivity {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Hold
    }

    fn should_ignore_pointer(&self) -> bool {
        false
    }

    fn is_scrolling(&self) -> bool {
        false
    }

    fn velocity(&self) -> f64 {
        0.0
    }

    fn dispose(self: Box<Self>) {
        if let Some(callback) = self.on_hold_canceled {
            callback();
        }
    }

    fn gesture_id(&self) -> Option<GestureId> {
        Some(self.gesture)
    }
}

impl fmt::Debug for HoldScrollActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoldScrollActivity")
            .field("gesture", &self.gesture)
            .field("has_cancel_callback", &self.on_hold_canceled.is_some())
            .finish()
    }
}

/// The user is dragging the content
#[derive(Debug)]
pub struct DragScrollActivity {
    controller: ScrollDragController,
}

impl DragScrollActivity {
    pub fn new(controller: ScrollDragController) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &ScrollDragController {
        &self.controller
    }
}

impl ScrollActivity for DragScrollActivity {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Drag
    }

    fn should_ignore_pointer(&self) -> bool {
        true
    }

    fn is_scrolling(&self) -> bool {
        true
    }

    /// The pointer drives the position, not a simulation
    fn velocity(&self) -> f64 {
        0.0
    }

    fn dispose(self: Box<Self>) {
        self.controller.dispose();
    }

    fn gesture_id(&self) -> Option<GestureId> {
        Some(self.controller.gesture())
    }

    fn as_drag_mut(&mut self) -> Option<&mut ScrollDragController> {
        Some(&mut self.controller)
    }

    fn start_notification(&self, metrics: ScrollMetrics) -> ScrollNotification {
        let drag_details = match self.controller.last_details() {
            Some(DragDetails::Start(details)) => Some(details.clone()),
            _ => None,
        };
        ScrollNotification::Start {
            metrics,
            drag_details,
        }
    }

    fn update_notification(&self, metrics: ScrollMetrics, scroll_delta: f64) -> ScrollNotification {
        ScrollNotification::Update {
            metrics,
            scroll_delta,
            drag_details: self.controller.last_update().cloned(),
        }
    }

    fn overscroll_notification(&self, metrics: ScrollMetrics, overscroll: f64) -> ScrollNotification {
        ScrollNotification::Overscroll {
            metrics,
            overscroll,
            velocity: 0.0,
            drag_details: self.controller.last_update().cloned(),
        }
    }

    fn end_notification(&self, metrics: ScrollMetrics) -> ScrollNotification {
        let drag_details = match self.controller.last_details() {
            Some(DragDetails::End(details)) => Some(details.clone()),
            _ => None,
        };
        ScrollNotification::End {
            metrics,
            drag_details,
        }
    }
}

/// Runs a physics simulation until it settles or hits a boundary
#[derive(Debug)]
pub struct BallisticScrollActivity {
    controller: AnimationController,
}

impl BallisticScrollActivity {
    pub fn new(simulation: Box<dyn Simulation>, vsync: &dyn TickerProvider) -> Self {
        let mut controller =
            AnimationController::unbounded(vsync, simulation.x(0.0), ActivityKind::Ballistic.to_string());
        // Progress is observed by polling in `tick`
        controller.animate_with(simulation);
        Self { controller }
    }
}

impl ScrollActivity for BallisticScrollActivity {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Ballistic
    }

    fn should_ignore_pointer(&self) -> bool {
        true
    }

    fn is_scrolling(&self) -> bool {
        true
    }

    fn velocity(&self) -> f64 {
        self.controller.velocity()
    }

    fn reset_activity(&mut self) -> ActivityRequest {
        ActivityRequest::GoBallistic(self.velocity())
    }

    fn apply_new_dimensions(&mut self) -> ActivityRequest {
        ActivityRequest::GoBallistic(self.velocity())
    }

    fn tick(&mut self) -> ActivityRequest {
        match self.controller.poll() {
            Some(frame) => ActivityRequest::MoveTo {
                pixels: frame.value,
                then: frame.done.then_some(0.0),
            },
            None => ActivityRequest::None,
        }
    }

    fn dispose(self: Box<Self>) {
        self.controller.dispose();
    }

    fn overscroll_notification(&self, metrics: ScrollMetrics, overscroll: f64) -> ScrollNotification {
        ScrollNotification::Overscroll {
            metrics,
            overscroll,
            velocity: self.velocity(),
            drag_details: None,
        }
    }
}

/// Animates the position to a target offset
#[derive(Debug)]
pub struct DrivenScrollActivity {
    controller: AnimationController,
    done: Completion,
}

impl DrivenScrollActivity {
    pub fn new(from: f64, to: f64, duration: Duration, curve: Easing, vsync: &dyn TickerProvider) -> Self {
        debug_assert!(!duration.is_zero());
        let mut controller = AnimationController::unbounded(vsync, from, ActivityKind::Driven.to_string());
        let done = controller.animate_to(to, duration, curve);
        Self { controller, done }
    }

    /// Resolves when the animation finishes or is interrupted
    pub fn done(&self) -> Completion {
        self.done.clone()
    }
}

impl ScrollActivity for DrivenScrollActivity {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Driven
    }

    fn should_ignore_pointer(&self) -> bool {
        true
    }

    fn is_scrolling(&self) -> bool {
        true
    }

    fn velocity(&self) -> f64 {
        self.controller.velocity()
    }

    fn tick(&mut self) -> ActivityRequest {
        match self.controller.poll() {
            Some(frame) => ActivityRequest::MoveTo {
                pixels: frame.value,
                then: frame.done.then_some(frame.velocity),
            },
            None => ActivityRequest::None,
        }
    }

    fn dispose(self: Box<Self>) {
        self.controller.dispose();
    }

    fn overscroll_notification(&self, metrics: ScrollMetrics, overscroll: f64) -> ScrollNotification {
        ScrollNotification::Overscroll {
            metrics,
            overscroll,
            velocity: self.velocity(),
            drag_details: None,
        }
    }
}
