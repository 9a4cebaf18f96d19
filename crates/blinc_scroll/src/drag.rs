//! Drag input for scroll positions
//!
//! [`ScrollDragController`] turns the update/end stream of one drag gesture
//! into scroll requests. It adds two pieces of hysteresis on top of the raw
//! deltas:
//!
//! - momentum carried over from an interrupted fling is dropped once the
//!   pointer has been stationary for a moment
//! - after the pointer rests, small deltas are swallowed until they add up
//!   to the physics' motion threshold, so resuming a drag does not jump
//!
//! The gesture layer never sees the controller itself. It gets a
//! [`ScrollDragHandle`] (or a [`ScrollHoldHandle`] for a pointer that has
//! not started dragging yet) that forwards to whichever position currently
//! owns the gesture.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use blinc_core::{lock, Drag, DragDetails, DragEndDetails, DragStartDetails, DragUpdateDetails};

use crate::activity::{ActivityRequest, CancelCallback};
use crate::config::DragConfig;
use crate::error::{Result, ScrollError};
use crate::metrics::{sign, AxisDirection};
use crate::position_with_single_context::ScrollPositionWithSingleContext;

/// Identifies one hold or drag gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GestureId(u64);

impl GestureId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gesture#{}", self.0)
    }
}

pub struct ScrollDragController {
    gesture: GestureId,
    last_details: Option<DragDetails>,
    on_drag_canceled: Option<CancelCallback>,
    carried_velocity: f64,
    motion_start_distance_threshold: Option<f64>,
    last_non_stationary_timestamp: Option<Duration>,
    retain_momentum: bool,
    /// Distance moved since the pointer last came to rest, while the start
    /// threshold is armed
    offset_since_last_stop: Option<f64>,
    config: DragConfig,
}

impl ScrollDragController {
    pub fn new(
        gesture: GestureId,
        details: DragStartDetails,
        on_drag_canceled: Option<CancelCallback>,
        carried_velocity: f64,
        motion_start_distance_threshold: Option<f64>,
        config: DragConfig,
    ) -> Self {
        debug_assert!(
            motion_start_distance_threshold.map_or(true, |t| t > 0.0),
            "motion start distance threshold must be positive"
        );
        let motion_start_distance_threshold = motion_start_distance_threshold.filter(|t| *t > 0.0);

        Self {
            gesture,
            last_non_stationary_timestamp: details.source_time_stamp,
            last_details: Some(DragDetails::Start(details)),
            on_drag_canceled,
            carried_velocity,
            retain_momentum: carried_velocity != 0.0,
            offset_since_last_stop: motion_start_distance_threshold.map(|_| 0.0),
            motion_start_distance_threshold,
            config,
        }
    }

    pub fn gesture(&self) -> GestureId {
        self.gesture
    }

    pub fn carried_velocity(&self) -> f64 {
        self.carried_velocity
    }

    pub fn motion_start_distance_threshold(&self) -> Option<f64> {
        self.motion_start_distance_threshold
    }

    /// Whether the carried fling velocity will still be added on release
    pub fn retains_momentum(&self) -> bool {
        self.retain_momentum
    }

    /// The most recent start, update or end details
    pub fn last_details(&self) -> Option<&DragDetails> {
        self.last_details.as_ref()
    }

    pub(crate) fn last_update(&self) -> Option<&DragUpdateDetails> {
        match &self.last_details {
            Some(DragDetails::Update(details)) => Some(details),
            _ => None,
        }
    }

    fn stationary_for(&self, timestamp: Duration) -> Duration {
        timestamp.saturating_sub(self.last_non_stationary_timestamp.unwrap_or_default())
    }

    fn maybe_lose_momentum(&mut self, offset: f64, timestamp: Option<Duration>) {
        if !self.retain_momentum || offset != 0.0 {
            return;
        }
        let stationary_too_long = match timestamp {
            Some(timestamp) => {
                self.stationary_for(timestamp) > self.config.momentum_retain_stationary_threshold()
            }
            None => true,
        };
        if stationary_too_long {
            tracing::trace!(gesture = %self.gesture, "drag lost carried momentum");
            self.retain_momentum = false;
        }
    }

    fn adjust_for_scroll_start_threshold(&mut self, offset: f64, timestamp: Option<Duration>) -> f64 {
        let Some(timestamp) = timestamp else {
            return offset;
        };

        if offset == 0.0 {
            if self.motion_start_distance_threshold.is_some()
                && self.offset_since_last_stop.is_none()
                && self.stationary_for(timestamp) > self.config.motion_stopped_threshold()
            {
                // Stopped long enough to re-arm the threshold
                self.offset_since_last_stop = Some(0.0);
            }
            return 0.0;
        }

        let (Some(since_stop), Some(threshold)) =
            (self.offset_since_last_stop, self.motion_start_distance_threshold)
        else {
            return offset;
        };

        let since_stop = since_stop + offset;
        if since_stop.abs() <= threshold {
            self.offset_since_last_stop = Some(since_stop);
            return 0.0;
        }

        self.offset_since_last_stop = None;
        if offset.abs() > self.config.big_threshold_break_distance {
            offset
        } else {
            (threshold / 3.0).min(offset.abs()) * sign(offset)
        }
    }

    /// The pointer moved
    pub fn update(&mut self, details: DragUpdateDetails, axis_direction: AxisDirection) -> Result<ActivityRequest> {
        let mut offset = details.primary_delta.ok_or(ScrollError::MissingPrimaryAxis {
            what: "DragUpdateDetails",
        })?;
        let timestamp = details.source_time_stamp;
        let is_scroll = details.is_scroll;
        self.last_details = Some(DragDetails::Update(details));

        if is_scroll {
            if offset == 0.0 {
                return Ok(ActivityRequest::None);
            }
            if axis_direction.is_reversed() {
                offset = -offset;
            }
            return Ok(ActivityRequest::ApplyUserScrollOffset(offset));
        }

        if offset != 0.0 {
            self.last_non_stationary_timestamp = timestamp;
        }
        self.maybe_lose_momentum(offset, timestamp);
        offset = self.adjust_for_scroll_start_threshold(offset, timestamp);
        if offset == 0.0 {
            return Ok(ActivityRequest::None);
        }
        if axis_direction.is_reversed() {
            offset = -offset;
        }
        tracing::trace!(gesture = %self.gesture, offset, "drag update");
        Ok(ActivityRequest::ApplyUserOffset(offset))
    }

    /// The pointer was released
    pub fn end(&mut self, details: DragEndDetails, axis_direction: AxisDirection) -> Result<ActivityRequest> {
        let primary_velocity = details.primary_velocity.ok_or(ScrollError::MissingPrimaryAxis {
            what: "DragEndDetails",
        })?;

        // Content moves against the pointer
        let mut velocity = -primary_velocity;
        if axis_direction.is_reversed() {
            velocity = -velocity;
        }
        self.last_details = Some(DragDetails::End(details));

        if self.retain_momentum && sign(velocity) == sign(self.carried_velocity) {
            velocity += self.carried_velocity;
        }
        tracing::debug!(gesture = %self.gesture, velocity, "drag ended");
        Ok(ActivityRequest::GoBallistic(velocity))
    }

    /// The gesture was abandoned
    pub fn cancel(&self) -> ActivityRequest {
        ActivityRequest::GoBallistic(0.0)
    }

    pub fn dispose(mut self) {
        self.last_details = None;
        if let Some(callback) = self.on_drag_canceled.take() {
            callback();
        }
    }
}

impl fmt::Debug for ScrollDragController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollDragController")
            .field("gesture", &self.gesture)
            .field("last_details", &self.last_details)
            .field("carried_velocity", &self.carried_velocity)
            .field("retain_momentum", &self.retain_momentum)
            .field("offset_since_last_stop", &self.offset_since_last_stop)
            .finish()
    }
}

/// Re-targetable pointer from gesture handles to the position owning the
/// gesture. A replacement position that absorbs an activity takes over the
/// slot, so handles issued earlier follow the activity.
pub(crate) type PositionSlot = Arc<Mutex<Weak<Mutex<ScrollPositionWithSingleContext>>>>;

/// Run `f` on the position the slot points at, if it is still alive
fn with_position<R>(
    slot: &PositionSlot,
    gesture: GestureId,
    f: impl FnOnce(&mut ScrollPositionWithSingleContext) -> Result<R>,
) -> Result<Option<R>> {
    let target = lock(slot).clone();
    match target.upgrade() {
        Some(position) => f(&mut *lock(&position)).map(Some),
        None => {
            tracing::warn!(%gesture, "gesture outlived its scroll position");
            Ok(None)
        }
    }
}

/// Lets the gesture layer release a hold
pub struct ScrollHoldHandle {
    slot: PositionSlot,
    gesture: GestureId,
}

impl ScrollHoldHandle {
    pub(crate) fn new(slot: PositionSlot, gesture: GestureId) -> Self {
        Self { slot, gesture }
    }

    pub fn gesture(&self) -> GestureId {
        self.gesture
    }

    /// The pointer went away without dragging
    pub fn cancel(&self) -> Result<()> {
        with_position(&self.slot, self.gesture, |position| position.cancel_hold(self.gesture))?;
        Ok(())
    }
}

impl fmt::Debug for ScrollHoldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollHoldHandle")
            .field("gesture", &self.gesture)
            .finish()
    }
}

/// Lets the gesture layer drive a drag
pub struct ScrollDragHandle {
    slot: PositionSlot,
    gesture: GestureId,
}

impl ScrollDragHandle {
    pub(crate) fn new(slot: PositionSlot, gesture: GestureId) -> Self {
        Self { slot, gesture }
    }

    pub fn gesture(&self) -> GestureId {
        self.gesture
    }
}

impl Drag for ScrollDragHandle {
    type Error = ScrollError;

    fn update(&mut self, details: DragUpdateDetails) -> Result<()> {
        with_position(&self.slot, self.gesture, |position| {
            position.drag_update(self.gesture, details)
        })?;
        Ok(())
    }

    fn end(&mut self, details: DragEndDetails) -> Result<()> {
        with_position(&self.slot, self.gesture, |position| position.drag_end(self.gesture, details))?;
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        with_position(&self.slot, self.gesture, |position| position.drag_cancel(self.gesture))?;
        Ok(())
    }
}

impl fmt::Debug for ScrollDragHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollDragHandle")
            .field("gesture", &self.gesture)
            .finish()
    }
}
