//! Shared test doubles for the scroll integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use blinc_animation::{SchedulerHandle, TickerProvider};
use blinc_scroll::{
    AxisDirection, PositionOptions, ScrollContext, ScrollNotification, ScrollPhysics,
    ScrollPositionWithSingleContext, SharedScrollPosition, StorageContext,
};
use tracing_subscriber::EnvFilter;

pub const FRAME: f64 = 1.0 / 60.0;

/// Route `tracing` output through the test harness; `RUST_LOG` selects levels
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A scrollable view that records everything the position tells it
pub struct RecordingContext {
    pub axis_direction: AxisDirection,
    vsync: SchedulerHandle,
    storage: Option<StorageContext>,
    notifications: Mutex<Vec<ScrollNotification>>,
    ignore_pointer: Mutex<Vec<bool>>,
    can_drag: Mutex<Option<bool>>,
}

impl RecordingContext {
    pub fn new(vsync: SchedulerHandle) -> Arc<Self> {
        Self::build(vsync, AxisDirection::Down, None)
    }

    pub fn with_storage(vsync: SchedulerHandle, storage: StorageContext) -> Arc<Self> {
        Self::build(vsync, AxisDirection::Down, Some(storage))
    }

    pub fn reversed(vsync: SchedulerHandle) -> Arc<Self> {
        Self::build(vsync, AxisDirection::Up, None)
    }

    fn build(vsync: SchedulerHandle, axis_direction: AxisDirection, storage: Option<StorageContext>) -> Arc<Self> {
        Arc::new(Self {
            axis_direction,
            vsync,
            storage,
            notifications: Mutex::new(Vec::new()),
            ignore_pointer: Mutex::new(Vec::new()),
            can_drag: Mutex::new(None),
        })
    }

    /// Drain the notifications recorded so far
    pub fn take(&self) -> Vec<ScrollNotification> {
        std::mem::take(&mut *self.notifications.lock().unwrap())
    }

    pub fn ignore_pointer_calls(&self) -> Vec<bool> {
        self.ignore_pointer.lock().unwrap().clone()
    }

    pub fn can_drag(&self) -> Option<bool> {
        *self.can_drag.lock().unwrap()
    }
}

impl ScrollContext for RecordingContext {
    fn axis_direction(&self) -> AxisDirection {
        self.axis_direction
    }

    fn vsync(&self) -> &dyn TickerProvider {
        &self.vsync
    }

    fn set_ignore_pointer(&self, value: bool) {
        self.ignore_pointer.lock().unwrap().push(value);
    }

    fn set_can_drag(&self, value: bool) {
        *self.can_drag.lock().unwrap() = Some(value);
    }

    fn dispatch_notification(&self, notification: &ScrollNotification) {
        self.notifications.lock().unwrap().push(notification.clone());
    }

    fn storage_context(&self) -> Option<StorageContext> {
        self.storage.clone()
    }
}

/// A position over `[0, max]` with a 400 pixel viewport
pub fn laid_out(physics: ScrollPhysics, context: Arc<RecordingContext>, max: f64) -> SharedScrollPosition {
    let position = ScrollPositionWithSingleContext::new(physics, context, PositionOptions::default(), None).unwrap();
    layout(&position, max);
    position
}

pub fn layout(position: &SharedScrollPosition, max: f64) {
    let mut p = position.lock().unwrap();
    p.apply_viewport_dimension(400.0);
    p.apply_content_dimensions(0.0, max).unwrap();
}

pub fn count(notifications: &[ScrollNotification], predicate: fn(&ScrollNotification) -> bool) -> usize {
    notifications.iter().filter(|n| predicate(n)).count()
}
