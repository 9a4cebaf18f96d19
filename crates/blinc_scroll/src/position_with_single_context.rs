//! A scroll position driven by a single scrollable view
//!
//! This is the position almost every scrollable uses. It performs the
//! requests its activities make, tracks the direction the user is scrolling
//! in, and hands out the hold and drag handles the gesture layer drives.
//!
//! Positions are shared as [`SharedScrollPosition`]. The host advances the
//! animation scheduler each frame and then calls
//! [`ScrollPositionWithSingleContext::tick`] so ballistic and driven
//! activities can move the offset.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use blinc_animation::{near_equal, Completion, Easing};
use blinc_core::{lock, DragEndDetails, DragStartDetails, DragUpdateDetails};

use crate::activity::{
    ActivityKind, ActivityRequest, BallisticScrollActivity, CancelCallback, DragScrollActivity,
    DrivenScrollActivity, HoldScrollActivity, IdleScrollActivity, ScrollActivity, ScrollActivityDelegate,
};
use crate::config::DragConfig;
use crate::context::{RevealTarget, ScrollContext};
use crate::drag::{GestureId, PositionSlot, ScrollDragController, ScrollDragHandle, ScrollHoldHandle};
use crate::error::Result;
use crate::metrics::{AxisDirection, ScrollDirection};
use crate::physics::ScrollPhysics;
use crate::position::ScrollPosition;

pub type SharedScrollPosition = Arc<Mutex<ScrollPositionWithSingleContext>>;

/// Construction options
#[derive(Clone, Debug)]
pub struct PositionOptions {
    /// Offset to start at when neither an absorbed position nor page storage supplies one
    pub initial_pixels: Option<f64>,
    /// Save the offset to page storage when scrolling ends, and restore it on creation
    pub keep_scroll_offset: bool,
    pub debug_label: Option<String>,
    pub drag: DragConfig,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            initial_pixels: Some(0.0),
            keep_scroll_offset: true,
            debug_label: None,
            drag: DragConfig::default(),
        }
    }
}

pub struct ScrollPositionWithSingleContext {
    position: ScrollPosition,
    /// Velocity of the activity a hold interrupted, carried into the next drag
    held_previous_velocity: f64,
    user_scroll_direction: ScrollDirection,
    self_weak: Weak<Mutex<ScrollPositionWithSingleContext>>,
    handle_slot: PositionSlot,
    drag_config: DragConfig,
}

impl ScrollPositionWithSingleContext {
    /// Create a position, taking over the state of `old_position` if given.
    ///
    /// The offset comes from the old position, then page storage, then
    /// `initial_pixels`, in that order.
    pub fn new(
        physics: ScrollPhysics,
        context: Arc<dyn ScrollContext>,
        options: PositionOptions,
        old_position: Option<&SharedScrollPosition>,
    ) -> Result<SharedScrollPosition> {
        let PositionOptions {
            initial_pixels,
            keep_scroll_offset,
            debug_label,
            drag,
        } = options;

        let shared = Arc::new_cyclic(|weak: &Weak<Mutex<Self>>| {
            Mutex::new(Self {
                position: ScrollPosition::new(physics, context, keep_scroll_offset, debug_label),
                held_previous_velocity: 0.0,
                user_scroll_direction: ScrollDirection::Idle,
                self_weak: weak.clone(),
                handle_slot: Arc::new(Mutex::new(weak.clone())),
                drag_config: drag,
            })
        });

        {
            let mut this = lock(&shared);
            if let Some(old) = old_position {
                this.absorb(&mut *lock(old))?;
            }
            if this.position.keep_scroll_offset() {
                this.position.restore_scroll_offset();
            }
            if this.position.pixels().is_none() {
                if let Some(initial_pixels) = initial_pixels {
                    this.position.correct_pixels(initial_pixels);
                }
            }
            if this.position.activity().is_none() {
                this.go_idle()?;
            }
            tracing::debug!(position = %this.position, "created scroll position");
        }
        Ok(shared)
    }

    /// Take over the offset, dimensions and activity of a position being replaced
    fn absorb(&mut self, other: &mut ScrollPositionWithSingleContext) -> Result<()> {
        tracing::debug!(position = %self.id(), from = %other.id(), "absorbing scroll position");
        self.position.absorb_dimensions(&other.position);

        let Some(activity) = other.position.take_activity() else {
            return self.go_idle();
        };
        self.position.adopt_activity(activity);
        self.user_scroll_direction = other.user_scroll_direction;

        // Gesture handles follow the activity
        *lock(&other.handle_slot) = self.self_weak.clone();
        self.handle_slot = other.handle_slot.clone();

        if !self.position.physics().same_chain(other.position.physics()) {
            let request = self
                .position
                .activity_mut()
                .map(|activity| activity.reset_activity())
                .unwrap_or_default();
            self.perform(request)?;
        }
        self.position.sync_activity_flags()
    }

    pub fn user_scroll_direction(&self) -> ScrollDirection {
        self.user_scroll_direction
    }

    /// Velocity the current hold interrupted, zero if not holding
    pub fn held_previous_velocity(&self) -> f64 {
        self.held_previous_velocity
    }

    pub fn activity_kind(&self) -> Option<ActivityKind> {
        self.position.activity().map(|activity| activity.kind())
    }

    fn begin_activity(&mut self, activity: Box<dyn ScrollActivity>) -> Result<()> {
        self.held_previous_velocity = 0.0;
        self.position.begin_activity(activity)?;
        let scrolling = self.position.activity().is_some_and(|activity| activity.is_scrolling());
        if !scrolling {
            self.update_user_scroll_direction(ScrollDirection::Idle)?;
        }
        Ok(())
    }

    fn update_user_scroll_direction(&mut self, direction: ScrollDirection) -> Result<()> {
        if self.user_scroll_direction == direction {
            return Ok(());
        }
        self.user_scroll_direction = direction;
        self.position.dispatch_user_scroll(direction)
    }

    /// Advance the current activity to this frame
    pub fn tick(&mut self) -> Result<()> {
        let request = self
            .position
            .activity_mut()
            .map(|activity| activity.tick())
            .unwrap_or_default();
        self.perform(request)
    }

    pub fn go_idle(&mut self) -> Result<()> {
        self.begin_activity(Box::new(IdleScrollActivity))
    }

    /// Start a ballistic activity if the physics wants one, else go idle
    pub fn go_ballistic(&mut self, velocity: f64) -> Result<()> {
        self.position.ensure_live()?;
        let metrics = self.position.metrics()?;
        let simulation = self.position.physics().create_ballistic_simulation(&metrics, velocity);
        match simulation {
            Some(simulation) => {
                tracing::debug!(position = %self.id(), velocity, "going ballistic");
                let context = self.position.context().clone();
                let activity = BallisticScrollActivity::new(simulation, context.vsync());
                self.begin_activity(Box::new(activity))
            }
            None => self.go_idle(),
        }
    }

    pub fn apply_user_offset(&mut self, delta: f64) -> Result<()> {
        self.update_user_scroll_direction(if delta > 0.0 {
            ScrollDirection::Forward
        } else {
            ScrollDirection::Reverse
        })?;
        let metrics = self.position.metrics()?;
        let pixels = metrics.pixels - self.position.physics().apply_physics_to_user_offset(&metrics, delta);
        self.position.set_pixels(pixels)?;
        Ok(())
    }

    pub fn apply_user_scroll_offset(&mut self, delta: f64) -> Result<()> {
        self.update_user_scroll_direction(if delta > 0.0 {
            ScrollDirection::Forward
        } else {
            ScrollDirection::Reverse
        })?;
        let metrics = self.position.metrics()?;
        let mut pixels = metrics.pixels - self.position.physics().apply_physics_to_user_offset(&metrics, delta);
        if pixels < metrics.min_scroll_extent {
            pixels = metrics.min_scroll_extent;
        }
        if pixels > metrics.max_scroll_extent {
            pixels = metrics.max_scroll_extent;
        }
        self.position.set_pixels(pixels)?;
        Ok(())
    }

    /// Jump to `value` without animation.
    ///
    /// Sends a start/update/end triplet if the offset changes, then lets the
    /// physics correct an out-of-range target.
    pub fn jump_to(&mut self, value: f64) -> Result<()> {
        self.go_idle()?;
        let old_pixels = self.position.require_pixels()?;
        if old_pixels != value {
            tracing::debug!(position = %self.id(), from = old_pixels, to = value, "jump");
            self.position.force_pixels(value)?;
            self.position.did_start_scroll()?;
            self.position.did_update_scroll_position_by(value - old_pixels)?;
            self.position.did_end_scroll()?;
        }
        self.go_ballistic(0.0)
    }

    /// Animate to `to`; the completion resolves when the animation finishes
    /// or is interrupted.
    ///
    /// Targets within the physics' distance tolerance and zero durations
    /// jump instead.
    pub fn animate_to(&mut self, to: f64, duration: Duration, curve: Easing) -> Result<Completion> {
        self.position.ensure_live()?;
        let pixels = self.position.require_pixels()?;
        let tolerance = self.position.physics().tolerance();
        if near_equal(to, pixels, tolerance.distance) || duration.is_zero() {
            self.jump_to(to)?;
            return Ok(Completion::resolved());
        }

        let context = self.position.context().clone();
        let activity = DrivenScrollActivity::new(pixels, to, duration, curve, context.vsync());
        let done = activity.done();
        self.begin_activity(Box::new(activity))?;
        Ok(done)
    }

    /// Scroll so that `target` sits at `alignment` within the viewport
    pub fn ensure_visible(
        &mut self,
        target: &dyn RevealTarget,
        alignment: f64,
        duration: Duration,
        curve: Easing,
    ) -> Result<Completion> {
        let metrics = self.position.metrics()?;
        let offset = target
            .offset_to_reveal(alignment)
            .max(metrics.min_scroll_extent)
            .min(metrics.max_scroll_extent);

        if offset == metrics.pixels {
            return Ok(Completion::resolved());
        }
        if duration.is_zero() {
            self.jump_to(offset)?;
            return Ok(Completion::resolved());
        }
        self.animate_to(offset, duration, curve)
    }

    /// A pointer touched the content; stop whatever is moving it
    pub fn hold(&mut self, on_hold_canceled: Option<CancelCallback>) -> Result<ScrollHoldHandle> {
        self.position.ensure_live()?;
        let previous_velocity = self.position.activity().map_or(0.0, |activity| activity.velocity());
        let gesture = GestureId::next();
        self.begin_activity(Box::new(HoldScrollActivity::new(gesture, on_hold_canceled)))?;
        self.held_previous_velocity = previous_velocity;
        tracing::debug!(position = %self.id(), %gesture, previous_velocity, "hold");
        Ok(ScrollHoldHandle::new(self.handle_slot.clone(), gesture))
    }

    /// A drag was recognized
    pub fn drag(
        &mut self,
        details: DragStartDetails,
        on_drag_canceled: Option<CancelCallback>,
    ) -> Result<ScrollDragHandle> {
        self.position.ensure_live()?;
        let gesture = GestureId::next();
        let physics = self.position.physics();
        let controller = ScrollDragController::new(
            gesture,
            details,
            on_drag_canceled,
            physics.carried_momentum(self.held_previous_velocity),
            physics.drag_start_distance_motion_threshold(),
            self.drag_config,
        );
        tracing::debug!(
            position = %self.id(),
            %gesture,
            carried_velocity = controller.carried_velocity(),
            "drag"
        );
        self.begin_activity(Box::new(DragScrollActivity::new(controller)))?;
        Ok(ScrollDragHandle::new(self.handle_slot.clone(), gesture))
    }

    pub(crate) fn cancel_hold(&mut self, gesture: GestureId) -> Result<()> {
        let holding = self
            .position
            .activity()
            .is_some_and(|activity| activity.kind() == ActivityKind::Hold && activity.gesture_id() == Some(gesture));
        if !holding {
            tracing::warn!(position = %self.id(), %gesture, "hold handle no longer owns the position");
            return Ok(());
        }
        self.go_ballistic(0.0)
    }

    fn drag_controller(&mut self, gesture: GestureId) -> Option<&mut ScrollDragController> {
        self.position
            .activity_mut()
            .and_then(|activity| activity.as_drag_mut())
            .filter(|controller| controller.gesture() == gesture)
    }

    fn drag_request(
        &mut self,
        gesture: GestureId,
        f: impl FnOnce(&mut ScrollDragController, AxisDirection) -> Result<ActivityRequest>,
    ) -> Result<()> {
        let axis_direction = self.position.axis_direction();
        let request = match self.drag_controller(gesture) {
            Some(controller) => f(controller, axis_direction)?,
            None => {
                tracing::warn!(position = %self.id(), %gesture, "drag handle no longer owns the position");
                return Ok(());
            }
        };
        self.perform(request)
    }

    pub(crate) fn drag_update(&mut self, gesture: GestureId, details: DragUpdateDetails) -> Result<()> {
        self.drag_request(gesture, |controller, axis| controller.update(details, axis))
    }

    pub(crate) fn drag_end(&mut self, gesture: GestureId, details: DragEndDetails) -> Result<()> {
        self.drag_request(gesture, |controller, axis| controller.end(details, axis))
    }

    pub(crate) fn drag_cancel(&mut self, gesture: GestureId) -> Result<()> {
        self.drag_request(gesture, |controller, _| Ok(controller.cancel()))
    }

    /// Record new extents from layout.
    ///
    /// Changes within a thousandth of a pixel are ignored unless the
    /// viewport changed or the offset was corrected since the last call.
    pub fn apply_content_dimensions(&mut self, min_scroll_extent: f64, max_scroll_extent: f64) -> Result<()> {
        if self.position.store_content_dimensions(min_scroll_extent, max_scroll_extent) {
            self.apply_new_dimensions()?;
            self.position.finish_content_dimensions();
        }
        Ok(())
    }

    fn apply_new_dimensions(&mut self) -> Result<()> {
        self.position.require_pixels()?;
        let request = self
            .position
            .activity_mut()
            .map(|activity| activity.apply_new_dimensions())
            .unwrap_or_default();
        self.perform(request)?;

        let metrics = self.position.metrics()?;
        let can_drag = self.position.physics().should_accept_user_offset(&metrics);
        self.position.context().set_can_drag(can_drag);
        Ok(())
    }

    /// Dispose the current activity. The position must not be used afterwards.
    pub fn dispose(&mut self) {
        tracing::debug!(position = %self.id(), "disposing scroll position");
        self.position.dispose_activity();
    }
}

impl ScrollActivityDelegate for ScrollPositionWithSingleContext {
    fn set_pixels(&mut self, pixels: f64) -> Result<f64> {
        self.position.set_pixels(pixels)
    }

    fn apply_user_offset(&mut self, delta: f64) -> Result<()> {
        ScrollPositionWithSingleContext::apply_user_offset(self, delta)
    }

    fn apply_user_scroll_offset(&mut self, delta: f64) -> Result<()> {
        ScrollPositionWithSingleContext::apply_user_scroll_offset(self, delta)
    }

    fn go_idle(&mut self) -> Result<()> {
        ScrollPositionWithSingleContext::go_idle(self)
    }

    fn go_ballistic(&mut self, velocity: f64) -> Result<()> {
        ScrollPositionWithSingleContext::go_ballistic(self, velocity)
    }
}

impl Deref for ScrollPositionWithSingleContext {
    type Target = ScrollPosition;

    fn deref(&self) -> &ScrollPosition {
        &self.position
    }
}

impl DerefMut for ScrollPositionWithSingleContext {
    fn deref_mut(&mut self) -> &mut ScrollPosition {
        &mut self.position
    }
}

impl fmt::Display for ScrollPositionWithSingleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.position)
    }
}

impl fmt::Debug for ScrollPositionWithSingleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollPositionWithSingleContext")
            .field("position", &self.position)
            .field("user_scroll_direction", &self.user_scroll_direction)
            .field("held_previous_velocity", &self.held_previous_velocity)
            .finish()
    }
}
