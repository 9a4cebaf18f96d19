//! Scroll position state
//!
//! [`ScrollPosition`] holds the offset, the extents and the current
//! activity, and implements the parts of the state machine that do not need
//! to perform activity requests: moving the offset through the physics'
//! boundary conditions, swapping activities with the right start/end
//! notifications, layout corrections and offset persistence.
//!
//! Offsets and extents are `None` until layout establishes them. Reading
//! them through [`ScrollPosition::metrics`] before then is an error rather
//! than a silent zero.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use blinc_animation::{near_equal_opt, Tolerance};
use blinc_core::{ChangeNotifier, ListenerId, ValueNotifier};

use crate::activity::ScrollActivity;
use crate::context::ScrollContext;
use crate::error::{Result, ScrollError};
use crate::metrics::{AxisDirection, ScrollDirection, ScrollMetrics};
use crate::notification::ScrollNotification;
use crate::physics::ScrollPhysics;

/// Identifies a scroll position for attach/detach bookkeeping
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionId(u64);

impl PositionId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct ScrollPosition {
    id: PositionId,
    physics: ScrollPhysics,
    context: Arc<dyn ScrollContext>,
    keep_scroll_offset: bool,
    debug_label: Option<String>,

    min_scroll_extent: Option<f64>,
    max_scroll_extent: Option<f64>,
    pixels: Option<f64>,
    viewport_dimension: Option<f64>,
    have_dimensions: bool,
    /// Forces the next `apply_content_dimensions` through even if the
    /// extents did not change
    did_change_viewport_dimension_or_receive_correction: bool,

    activity: Option<Box<dyn ScrollActivity>>,
    disposed: bool,
    is_scrolling: Arc<ValueNotifier<bool>>,
    listeners: Arc<ChangeNotifier<f64>>,
}

impl ScrollPosition {
    pub(crate) fn new(
        physics: ScrollPhysics,
        context: Arc<dyn ScrollContext>,
        keep_scroll_offset: bool,
        debug_label: Option<String>,
    ) -> Self {
        Self {
            id: PositionId::next(),
            physics,
            context,
            keep_scroll_offset,
            debug_label,
            min_scroll_extent: None,
            max_scroll_extent: None,
            pixels: None,
            viewport_dimension: None,
            have_dimensions: false,
            did_change_viewport_dimension_or_receive_correction: true,
            activity: None,
            disposed: false,
            is_scrolling: Arc::new(ValueNotifier::new(false)),
            listeners: Arc::new(ChangeNotifier::new()),
        }
    }

    pub fn id(&self) -> PositionId {
        self.id
    }

    pub fn physics(&self) -> &ScrollPhysics {
        &self.physics
    }

    pub fn context(&self) -> &Arc<dyn ScrollContext> {
        &self.context
    }

    pub fn keep_scroll_offset(&self) -> bool {
        self.keep_scroll_offset
    }

    pub fn debug_label(&self) -> Option<&str> {
        self.debug_label.as_deref()
    }

    pub fn axis_direction(&self) -> AxisDirection {
        self.context.axis_direction()
    }

    pub fn pixels(&self) -> Option<f64> {
        self.pixels
    }

    pub fn min_scroll_extent(&self) -> Option<f64> {
        self.min_scroll_extent
    }

    pub fn max_scroll_extent(&self) -> Option<f64> {
        self.max_scroll_extent
    }

    pub fn viewport_dimension(&self) -> Option<f64> {
        self.viewport_dimension
    }

    /// Whether content dimensions have been applied at least once
    pub fn have_dimensions(&self) -> bool {
        self.have_dimensions
    }

    pub fn activity(&self) -> Option<&dyn ScrollActivity> {
        self.activity.as_deref()
    }

    pub(crate) fn activity_mut(&mut self) -> Option<&mut (dyn ScrollActivity + 'static)> {
        self.activity.as_deref_mut()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            return Err(ScrollError::Disposed(self.id));
        }
        Ok(())
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling.get()
    }

    /// Observable "is scrolling" flag
    pub fn is_scrolling_notifier(&self) -> Arc<ValueNotifier<bool>> {
        self.is_scrolling.clone()
    }

    /// Listen for offset changes; the listener receives the new offset.
    ///
    /// Listeners run while the position is being mutated and must not lock it.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&f64) + Send + Sync + 'static,
    {
        self.listeners.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove_listener(id)
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.listener_count()
    }

    pub(crate) fn require_pixels(&self) -> Result<f64> {
        self.pixels.ok_or(ScrollError::MissingPixels)
    }

    /// Snapshot of the current metrics
    pub fn metrics(&self) -> Result<ScrollMetrics> {
        let missing = |what| ScrollError::MissingDimensions { what };
        Ok(ScrollMetrics {
            min_scroll_extent: self.min_scroll_extent.ok_or(missing("min scroll extent"))?,
            max_scroll_extent: self.max_scroll_extent.ok_or(missing("max scroll extent"))?,
            pixels: self.require_pixels()?,
            viewport_dimension: self.viewport_dimension.ok_or(missing("viewport dimension"))?,
            axis_direction: self.axis_direction(),
        })
    }

    fn current_activity(&self) -> Result<&dyn ScrollActivity> {
        self.activity.as_deref().ok_or(ScrollError::Disposed(self.id))
    }

    /// Move to `new_pixels`, returning the overscroll the physics refused.
    ///
    /// Only valid while a scrolling activity is installed. Listeners and an
    /// update notification fire if the offset changed, then an overscroll
    /// notification if part of the move was refused.
    pub fn set_pixels(&mut self, new_pixels: f64) -> Result<f64> {
        self.ensure_live()?;
        let activity = self.current_activity()?;
        if !activity.is_scrolling() {
            return Err(ScrollError::NotScrolling {
                activity: activity.kind(),
            });
        }

        let old_pixels = self.require_pixels()?;
        if new_pixels == old_pixels {
            return Ok(0.0);
        }

        let metrics = self.metrics()?;
        let overscroll = self.physics.apply_boundary_conditions(&metrics, new_pixels)?;
        let pixels = new_pixels - overscroll;
        self.pixels = Some(pixels);
        tracing::trace!(position = %self.id, new_pixels, pixels, overscroll, "set_pixels");

        if pixels != old_pixels {
            self.notify_listeners(pixels);
            self.did_update_scroll_position_by(pixels - old_pixels)?;
        }
        if overscroll != 0.0 {
            self.did_overscroll_by(overscroll)?;
            return Ok(overscroll);
        }
        Ok(0.0)
    }

    /// Set the offset during layout, without boundary conditions or notifications
    pub fn correct_pixels(&mut self, value: f64) {
        self.pixels = Some(value);
    }

    /// Shift the offset during layout and force the next content dimensions through
    pub fn correct_by(&mut self, correction: f64) -> Result<()> {
        let pixels = self.require_pixels()?;
        self.pixels = Some(pixels + correction);
        self.did_change_viewport_dimension_or_receive_correction = true;
        Ok(())
    }

    /// Set the offset without boundary conditions, notifying listeners
    pub(crate) fn force_pixels(&mut self, value: f64) -> Result<()> {
        self.ensure_live()?;
        self.require_pixels()?;
        self.pixels = Some(value);
        self.notify_listeners(value);
        Ok(())
    }

    fn notify_listeners(&self, pixels: f64) {
        self.listeners.notify(&pixels);
    }

    /// Record the viewport size from layout
    pub fn apply_viewport_dimension(&mut self, viewport_dimension: f64) -> bool {
        if self.viewport_dimension != Some(viewport_dimension) {
            tracing::debug!(position = %self.id, viewport_dimension, "viewport dimension changed");
            self.viewport_dimension = Some(viewport_dimension);
            self.did_change_viewport_dimension_or_receive_correction = true;
        }
        true
    }

    /// Store new extents if they differ from the current ones.
    ///
    /// Returns whether the activity should re-evaluate the new dimensions.
    pub(crate) fn store_content_dimensions(&mut self, min: f64, max: f64) -> bool {
        let epsilon = Tolerance::DEFAULT.distance;
        let changed = !near_equal_opt(self.min_scroll_extent, Some(min), epsilon)
            || !near_equal_opt(self.max_scroll_extent, Some(max), epsilon)
            || self.did_change_viewport_dimension_or_receive_correction;
        if changed {
            tracing::debug!(position = %self.id, min, max, "content dimensions changed");
            self.min_scroll_extent = Some(min);
            self.max_scroll_extent = Some(max);
            self.have_dimensions = true;
        }
        changed
    }

    pub(crate) fn finish_content_dimensions(&mut self) {
        self.did_change_viewport_dimension_or_receive_correction = false;
    }

    /// Install `new_activity`, disposing the current one.
    ///
    /// An end notification is sent while the old activity is still installed
    /// if it was scrolling and the new one is not; a start notification once
    /// the new one is installed if scrolling just began.
    pub(crate) fn begin_activity(&mut self, new_activity: Box<dyn ScrollActivity>) -> Result<()> {
        self.ensure_live()?;
        let (old_ignore_pointer, was_scrolling) = match self.activity.as_deref() {
            Some(old) => (old.should_ignore_pointer(), old.is_scrolling()),
            None => (false, false),
        };

        if was_scrolling && !new_activity.is_scrolling() {
            self.did_end_scroll()?;
        }

        let to = new_activity.kind();
        if let Some(old) = self.activity.replace(new_activity) {
            tracing::debug!(position = %self.id, from = %old.kind(), %to, "begin activity");
            old.dispose();
        }

        let activity = self.current_activity()?;
        let ignore_pointer = activity.should_ignore_pointer();
        let is_scrolling = activity.is_scrolling();
        if old_ignore_pointer != ignore_pointer {
            self.context.set_ignore_pointer(ignore_pointer);
        }
        self.is_scrolling.set(is_scrolling);

        if !was_scrolling && is_scrolling {
            self.did_start_scroll()?;
        }
        Ok(())
    }

    /// Take the activity out, leaving none installed
    pub(crate) fn take_activity(&mut self) -> Option<Box<dyn ScrollActivity>> {
        self.activity.take()
    }

    /// Copy offset and dimensions from a position being replaced
    pub(crate) fn absorb_dimensions(&mut self, other: &ScrollPosition) {
        debug_assert!(self.pixels.is_none(), "absorb into a position that already has pixels");
        self.min_scroll_extent = other.min_scroll_extent;
        self.max_scroll_extent = other.max_scroll_extent;
        self.pixels = other.pixels;
        self.viewport_dimension = other.viewport_dimension;
    }

    /// Adopt an activity taken from another position
    pub(crate) fn adopt_activity(&mut self, activity: Box<dyn ScrollActivity>) {
        debug_assert!(self.activity.is_none());
        self.activity = Some(activity);
    }

    /// Sync the context and the scrolling flag with the current activity
    pub(crate) fn sync_activity_flags(&mut self) -> Result<()> {
        let activity = self.current_activity()?;
        let (ignore_pointer, is_scrolling) = (activity.should_ignore_pointer(), activity.is_scrolling());
        self.context.set_ignore_pointer(ignore_pointer);
        self.is_scrolling.set(is_scrolling);
        Ok(())
    }

    fn dispatch(&self, notification: ScrollNotification) {
        tracing::trace!(position = %self.id, %notification, "dispatch");
        self.context.dispatch_notification(&notification);
    }

    pub(crate) fn did_start_scroll(&self) -> Result<()> {
        let notification = self.current_activity()?.start_notification(self.metrics()?);
        self.dispatch(notification);
        Ok(())
    }

    pub(crate) fn did_update_scroll_position_by(&self, delta: f64) -> Result<()> {
        let notification = self.current_activity()?.update_notification(self.metrics()?, delta);
        self.dispatch(notification);
        Ok(())
    }

    pub(crate) fn did_overscroll_by(&self, overscroll: f64) -> Result<()> {
        let notification = self
            .current_activity()?
            .overscroll_notification(self.metrics()?, overscroll);
        self.dispatch(notification);
        Ok(())
    }

    pub(crate) fn did_end_scroll(&self) -> Result<()> {
        let notification = self.current_activity()?.end_notification(self.metrics()?);
        self.dispatch(notification);
        if self.keep_scroll_offset {
            self.save_scroll_offset();
        }
        Ok(())
    }

    pub(crate) fn dispatch_user_scroll(&self, direction: ScrollDirection) -> Result<()> {
        let metrics = self.metrics()?;
        self.dispatch(ScrollNotification::UserScroll { metrics, direction });
        Ok(())
    }

    /// Persist the offset in the context's page storage, if it has one
    pub fn save_scroll_offset(&self) {
        if let (Some(storage), Some(pixels)) = (self.context.storage_context(), self.pixels) {
            tracing::debug!(position = %self.id, key = %storage.key, pixels, "saving scroll offset");
            storage.write(pixels);
        }
    }

    /// Restore a persisted offset if this position has none yet
    pub fn restore_scroll_offset(&mut self) {
        if self.pixels.is_some() {
            return;
        }
        let restored = self.context.storage_context().and_then(|storage| storage.read());
        if let Some(pixels) = restored {
            tracing::debug!(position = %self.id, pixels, "restored scroll offset");
            self.correct_pixels(pixels);
        }
    }

    /// Dispose the current activity; the position must not be used afterwards
    pub(crate) fn dispose_activity(&mut self) {
        self.disposed = true;
        if let Some(activity) = self.activity.take() {
            activity.dispose();
        }
    }
}

fn describe(value: Option<f64>) -> String {
    value.map_or_else(|| "null".to_string(), |v| format!("{v:.1}"))
}

impl fmt::Display for ScrollPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScrollPosition{}(", self.id)?;
        if let Some(label) = &self.debug_label {
            write!(f, "{label}, ")?;
        }
        write!(
            f,
            "range: {}..{}, viewport: {}, ",
            describe(self.min_scroll_extent),
            describe(self.max_scroll_extent),
            describe(self.viewport_dimension)
        )?;
        match self.activity.as_deref() {
            Some(activity) => write!(f, "{}, ", activity.kind())?,
            None => write!(f, "disposed, ")?,
        }
        write!(f, "{}, offset: {})", self.physics, describe(self.pixels))
    }
}

impl fmt::Debug for ScrollPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollPosition")
            .field("id", &self.id)
            .field("pixels", &self.pixels)
            .field("min_scroll_extent", &self.min_scroll_extent)
            .field("max_scroll_extent", &self.max_scroll_extent)
            .field("viewport_dimension", &self.viewport_dimension)
            .field("activity", &self.activity)
            .field("physics", &self.physics)
            .finish()
    }
}
