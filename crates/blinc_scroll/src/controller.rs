//! Scroll controllers
//!
//! A [`ScrollController`] is the handle application code keeps to read and
//! drive the offset of one or more scrollables. Scrollables create their
//! positions through the controller and attach them; the controller forwards
//! every offset change of an attached position to its own listeners.
//!
//! [`TrackingScrollController`] additionally remembers which attached
//! position moved last, so a newly created position can start where the
//! user left off in a sibling view.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use blinc_animation::{Completion, Easing};
use blinc_core::{lock, ChangeNotifier, ListenerId};
use rustc_hash::FxHashMap;

use crate::context::ScrollContext;
use crate::error::{Result, ScrollError};
use crate::physics::ScrollPhysics;
use crate::position::PositionId;
use crate::position_with_single_context::{PositionOptions, ScrollPositionWithSingleContext, SharedScrollPosition};

struct Attached {
    id: PositionId,
    position: SharedScrollPosition,
    /// Forwards the position's changes to the controller's listeners
    listener: ListenerId,
}

pub struct ScrollController {
    initial_scroll_offset: f64,
    keep_scroll_offset: bool,
    debug_label: Option<String>,
    positions: Vec<Attached>,
    notifier: Arc<ChangeNotifier<f64>>,
}

impl ScrollController {
    pub fn new() -> Self {
        Self {
            initial_scroll_offset: 0.0,
            keep_scroll_offset: true,
            debug_label: None,
            positions: Vec::new(),
            notifier: Arc::new(ChangeNotifier::new()),
        }
    }

    pub fn with_initial_scroll_offset(mut self, offset: f64) -> Self {
        self.initial_scroll_offset = offset;
        self
    }

    pub fn with_keep_scroll_offset(mut self, keep: bool) -> Self {
        self.keep_scroll_offset = keep;
        self
    }

    pub fn with_debug_label(mut self, label: impl Into<String>) -> Self {
        self.debug_label = Some(label.into());
        self
    }

    /// Offset new positions start at when there is nothing to restore
    pub fn initial_scroll_offset(&self) -> f64 {
        self.initial_scroll_offset
    }

    pub fn keep_scroll_offset(&self) -> bool {
        self.keep_scroll_offset
    }

    pub fn debug_label(&self) -> Option<&str> {
        self.debug_label.as_deref()
    }

    pub fn has_clients(&self) -> bool {
        !self.positions.is_empty()
    }

    pub fn client_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> Vec<SharedScrollPosition> {
        self.positions.iter().map(|attached| attached.position.clone()).collect()
    }

    pub(crate) fn find(&self, id: PositionId) -> Option<SharedScrollPosition> {
        self.positions
            .iter()
            .find(|attached| attached.id == id)
            .map(|attached| attached.position.clone())
    }

    /// The only attached position
    pub fn position(&self) -> Result<SharedScrollPosition> {
        match self.positions.as_slice() {
            [] => Err(ScrollError::NoClients),
            [attached] => Ok(attached.position.clone()),
            many => Err(ScrollError::MultipleClients(many.len())),
        }
    }

    /// Offset of the only attached position
    pub fn offset(&self) -> Result<f64> {
        let position = self.position()?;
        let pixels = lock(&position).require_pixels()?;
        Ok(pixels)
    }

    /// Listen for offset changes of any attached position.
    ///
    /// Listeners run while the changed position is locked and must not lock it.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&f64) + Send + Sync + 'static,
    {
        self.notifier.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }

    /// Animate every attached position to `offset`.
    ///
    /// The completion resolves once all of them have finished.
    pub fn animate_to(&self, offset: f64, duration: Duration, curve: Easing) -> Result<Completion> {
        if self.positions.is_empty() {
            return Err(ScrollError::NoClients);
        }
        let mut completions = Vec::with_capacity(self.positions.len());
        for position in self.positions() {
            completions.push(lock(&position).animate_to(offset, duration, curve)?);
        }
        Ok(Completion::all(completions))
    }

    /// Jump every attached position to `value`
    pub fn jump_to(&self, value: f64) -> Result<()> {
        if self.positions.is_empty() {
            return Err(ScrollError::NoClients);
        }
        for position in self.positions() {
            lock(&position).jump_to(value)?;
        }
        Ok(())
    }

    pub fn attach(&mut self, position: &SharedScrollPosition) -> Result<()> {
        let guard = lock(position);
        let id = guard.id();
        if self.positions.iter().any(|attached| attached.id == id) {
            return Err(ScrollError::AlreadyAttached(id));
        }

        let notifier = self.notifier.clone();
        let listener = guard.add_listener(move |pixels| notifier.notify(pixels));
        drop(guard);

        tracing::debug!(controller = %self, position = %id, "attach");
        self.positions.push(Attached {
            id,
            position: position.clone(),
            listener,
        });
        Ok(())
    }

    pub fn detach(&mut self, position: &SharedScrollPosition) -> Result<()> {
        let guard = lock(position);
        let id = guard.id();
        let index = self
            .positions
            .iter()
            .position(|attached| attached.id == id)
            .ok_or(ScrollError::NotAttached(id))?;

        let attached = self.positions.remove(index);
        guard.remove_listener(attached.listener);
        drop(guard);

        tracing::debug!(controller = %self, position = %id, "detach");
        Ok(())
    }

    /// Stop forwarding changes from every attached position
    pub fn dispose(&mut self) {
        for attached in self.positions.drain(..) {
            lock(&attached.position).remove_listener(attached.listener);
        }
        self.notifier.clear();
    }

    /// Create the position a scrollable will attach to this controller
    pub fn create_scroll_position(
        &self,
        physics: ScrollPhysics,
        context: Arc<dyn ScrollContext>,
        old_position: Option<&SharedScrollPosition>,
    ) -> Result<SharedScrollPosition> {
        self.create_scroll_position_at(self.initial_scroll_offset, physics, context, old_position)
    }

    fn create_scroll_position_at(
        &self,
        initial_scroll_offset: f64,
        physics: ScrollPhysics,
        context: Arc<dyn ScrollContext>,
        old_position: Option<&SharedScrollPosition>,
    ) -> Result<SharedScrollPosition> {
        let options = PositionOptions {
            initial_pixels: Some(initial_scroll_offset),
            keep_scroll_offset: self.keep_scroll_offset,
            debug_label: self.debug_label.clone(),
            ..PositionOptions::default()
        };
        ScrollPositionWithSingleContext::new(physics, context, options, old_position)
    }

    fn describe(&self, name: &str, initial_scroll_offset: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(label) = &self.debug_label {
            parts.push(label.clone());
        }
        if initial_scroll_offset != 0.0 {
            parts.push(format!("initialScrollOffset: {initial_scroll_offset:.1}"));
        }
        match self.positions.as_slice() {
            [] => parts.push("no clients".to_string()),
            [attached] => match attached.position.try_lock().ok().and_then(|p| p.pixels()) {
                Some(pixels) => parts.push(format!("one client, offset {pixels:.1}")),
                None => parts.push("one client".to_string()),
            },
            many => parts.push(format!("{} clients", many.len())),
        }
        write!(f, "{name}({})", parts.join(", "))
    }
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScrollController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe("ScrollController", self.initial_scroll_offset, f)
    }
}

impl fmt::Debug for ScrollController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Debug, Default)]
struct LastUpdated {
    position: Option<PositionId>,
    offset: Option<f64>,
}

/// A controller that remembers which of its positions moved last
pub struct TrackingScrollController {
    controller: ScrollController,
    position_listeners: FxHashMap<PositionId, ListenerId>,
    last_updated: Arc<Mutex<LastUpdated>>,
}

impl TrackingScrollController {
    pub fn new(controller: ScrollController) -> Self {
        Self {
            controller,
            position_listeners: FxHashMap::default(),
            last_updated: Arc::new(Mutex::new(LastUpdated::default())),
        }
    }

    /// The underlying controller, for reads and fan-out operations
    pub fn controller(&self) -> &ScrollController {
        &self.controller
    }

    /// The attached position that changed most recently
    pub fn most_recently_updated_position(&self) -> Option<SharedScrollPosition> {
        let id = lock(&self.last_updated).position?;
        self.controller.find(id)
    }

    /// The offset of the most recently changed position, or the
    /// controller's initial offset if none has changed yet
    pub fn initial_scroll_offset(&self) -> f64 {
        lock(&self.last_updated)
            .offset
            .unwrap_or(self.controller.initial_scroll_offset)
    }

    pub fn attach(&mut self, position: &SharedScrollPosition) -> Result<()> {
        self.controller.attach(position)?;

        let guard = lock(position);
        let id = guard.id();
        debug_assert!(!self.position_listeners.contains_key(&id));
        let last_updated = self.last_updated.clone();
        let listener = guard.add_listener(move |pixels| {
            let mut last = lock(&last_updated);
            last.position = Some(id);
            last.offset = Some(*pixels);
        });
        self.position_listeners.insert(id, listener);
        Ok(())
    }

    pub fn detach(&mut self, position: &SharedScrollPosition) -> Result<()> {
        self.controller.detach(position)?;

        let guard = lock(position);
        let id = guard.id();
        if let Some(listener) = self.position_listeners.remove(&id) {
            guard.remove_listener(listener);
        }
        drop(guard);

        let mut last = lock(&self.last_updated);
        if last.position == Some(id) {
            last.position = None;
        }
        if self.position_listeners.is_empty() {
            last.offset = None;
        }
        Ok(())
    }

    pub fn dispose(&mut self) {
        for position in self.controller.positions() {
            let guard = lock(&position);
            if let Some(listener) = self.position_listeners.remove(&guard.id()) {
                guard.remove_listener(listener);
            }
        }
        self.controller.dispose();
    }

    /// Create a position starting at [`Self::initial_scroll_offset`]
    pub fn create_scroll_position(
        &self,
        physics: ScrollPhysics,
        context: Arc<dyn ScrollContext>,
        old_position: Option<&SharedScrollPosition>,
    ) -> Result<SharedScrollPosition> {
        self.controller
            .create_scroll_position_at(self.initial_scroll_offset(), physics, context, old_position)
    }

    pub fn jump_to(&self, value: f64) -> Result<()> {
        self.controller.jump_to(value)
    }

    pub fn animate_to(&self, offset: f64, duration: Duration, curve: Easing) -> Result<Completion> {
        self.controller.animate_to(offset, duration, curve)
    }
}

impl fmt::Display for TrackingScrollController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.controller
            .describe("TrackingScrollController", self.initial_scroll_offset(), f)
    }
}

impl fmt::Debug for TrackingScrollController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use blinc_animation::{AnimationScheduler, SchedulerHandle, TickerProvider};
    use blinc_core::DragStartDetails;

    use crate::metrics::AxisDirection;
    use crate::notification::ScrollNotification;

    struct QuietContext {
        vsync: SchedulerHandle,
    }

    impl ScrollContext for QuietContext {
        fn axis_direction(&self) -> AxisDirection {
            AxisDirection::Down
        }

        fn vsync(&self) -> &dyn TickerProvider {
            &self.vsync
        }

        fn set_ignore_pointer(&self, _value: bool) {}

        fn set_can_drag(&self, _value: bool) {}

        fn dispatch_notification(&self, _notification: &ScrollNotification) {}
    }

    fn position_for(controller: &ScrollController, scheduler: &AnimationScheduler) -> SharedScrollPosition {
        let context = Arc::new(QuietContext {
            vsync: scheduler.handle(),
        });
        let position = controller
            .create_scroll_position(ScrollPhysics::clamping(), context, None)
            .unwrap();
        {
            let mut p = lock(&position);
            p.apply_viewport_dimension(400.0);
            p.apply_content_dimensions(0.0, 1000.0).unwrap();
        }
        position
    }

    #[test]
    fn test_attach_and_detach_are_symmetric() {
        let scheduler = AnimationScheduler::new();
        let mut controller = ScrollController::new();
        let position = position_for(&controller, &scheduler);

        controller.attach(&position).unwrap();
        assert_eq!(lock(&position).listener_count(), 1);
        assert!(matches!(
            controller.attach(&position),
            Err(ScrollError::AlreadyAttached(_))
        ));

        controller.detach(&position).unwrap();
        assert_eq!(lock(&position).listener_count(), 0);
        assert!(matches!(controller.detach(&position), Err(ScrollError::NotAttached(_))));
    }

    #[test]
    fn test_position_requires_exactly_one_client() {
        let scheduler = AnimationScheduler::new();
        let mut controller = ScrollController::new();
        assert!(matches!(controller.position(), Err(ScrollError::NoClients)));
        assert!(matches!(controller.jump_to(10.0), Err(ScrollError::NoClients)));

        let a = position_for(&controller, &scheduler);
        let b = position_for(&controller, &scheduler);
        controller.attach(&a).unwrap();
        assert!(controller.position().is_ok());
        controller.attach(&b).unwrap();
        assert!(matches!(controller.position(), Err(ScrollError::MultipleClients(2))));
    }

    #[test]
    fn test_jump_to_fans_out_and_notifies() {
        let scheduler = AnimationScheduler::new();
        let mut controller = ScrollController::new();
        let a = position_for(&controller, &scheduler);
        let b = position_for(&controller, &scheduler);
        controller.attach(&a).unwrap();
        controller.attach(&b).unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        controller.add_listener(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        controller.jump_to(120.0).unwrap();
        assert_eq!(lock(&a).pixels(), Some(120.0));
        assert_eq!(lock(&b).pixels(), Some(120.0));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_animate_to_resolves_when_all_finish() {
        let mut scheduler = AnimationScheduler::new();
        let mut controller = ScrollController::new();
        let a = position_for(&controller, &scheduler);
        let b = position_for(&controller, &scheduler);
        controller.attach(&a).unwrap();
        controller.attach(&b).unwrap();

        let done = controller
            .animate_to(200.0, Duration::from_millis(50), Easing::EaseOut)
            .unwrap();
        assert!(!done.is_complete());

        scheduler.advance(1.0 / 60.0);
        lock(&a).tick().unwrap();
        lock(&b).tick().unwrap();
        assert!(!done.is_complete());

        for _ in 0..6 {
            scheduler.advance(1.0 / 60.0);
            lock(&a).tick().unwrap();
            lock(&b).tick().unwrap();
        }
        assert!(done.is_complete());
        assert_eq!(controller.positions().len(), 2);
    }

    #[test]
    fn test_display() {
        let scheduler = AnimationScheduler::new();
        let mut controller = ScrollController::new()
            .with_debug_label("feed")
            .with_initial_scroll_offset(12.0);
        assert_eq!(
            controller.to_string(),
            "ScrollController(feed, initialScrollOffset: 12.0, no clients)"
        );

        let position = position_for(&controller, &scheduler);
        controller.attach(&position).unwrap();
        assert_eq!(
            controller.to_string(),
            "ScrollController(feed, initialScrollOffset: 12.0, one client, offset 12.0)"
        );

        let other = position_for(&controller, &scheduler);
        controller.attach(&other).unwrap();
        assert!(controller.to_string().ends_with("2 clients)"));
    }

    #[test]
    fn test_offset_reads_single_client() {
        let scheduler = AnimationScheduler::new();
        let mut controller = ScrollController::new().with_initial_scroll_offset(40.0);
        let position = position_for(&controller, &scheduler);
        controller.attach(&position).unwrap();
        assert_eq!(controller.offset().unwrap(), 40.0);
    }

    #[test]
    fn test_tracking_remembers_last_updated_position() {
        let scheduler = AnimationScheduler::new();
        let mut tracking = TrackingScrollController::new(ScrollController::new());
        let context = || {
            Arc::new(QuietContext {
                vsync: scheduler.handle(),
            }) as Arc<dyn ScrollContext>
        };

        let a = tracking
            .create_scroll_position(ScrollPhysics::clamping(), context(), None)
            .unwrap();
        let b = tracking
            .create_scroll_position(ScrollPhysics::clamping(), context(), None)
            .unwrap();
        for position in [&a, &b] {
            let mut p = lock(position);
            p.apply_viewport_dimension(400.0);
            p.apply_content_dimensions(0.0, 1000.0).unwrap();
        }
        tracking.attach(&a).unwrap();
        tracking.attach(&b).unwrap();
        assert!(tracking.most_recently_updated_position().is_none());
        assert_eq!(tracking.initial_scroll_offset(), 0.0);

        {
            let mut p = lock(&b);
            let _drag = p.drag(DragStartDetails::default(), None).unwrap();
            p.apply_user_offset(-75.0).unwrap();
        }
        let last = tracking.most_recently_updated_position().unwrap();
        assert!(Arc::ptr_eq(&last, &b));
        assert_eq!(tracking.initial_scroll_offset(), 75.0);

        // New positions start where the user left off
        let c = tracking
            .create_scroll_position(ScrollPhysics::clamping(), context(), None)
            .unwrap();
        assert_eq!(lock(&c).pixels(), Some(75.0));

        tracking.detach(&b).unwrap();
        assert!(tracking.most_recently_updated_position().is_none());
        assert_eq!(tracking.initial_scroll_offset(), 75.0);

        tracking.detach(&a).unwrap();
        assert_eq!(tracking.initial_scroll_offset(), 0.0);
        assert_eq!(lock(&a).listener_count(), 0);
    }
}
