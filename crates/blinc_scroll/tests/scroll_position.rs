//! Integration tests for scroll positions driven through their public API
//!
//! These tests verify that:
//! - User offsets, jumps and animations produce the expected notifications
//! - Start and end notifications pair up across activity changes
//! - Flings settle through the scheduler, even when it has gone away
//! - Offsets survive rebuilds through page storage and absorb

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blinc_animation::{AnimationScheduler, Easing, Tolerance};
use blinc_core::{Drag, DragEndDetails, DragStartDetails, DragUpdateDetails};
use blinc_scroll::{
    ActivityKind, PageStorageBucket, PageStorageKey, PhysicsKind, PhysicsPolicy, PositionOptions,
    ScrollDirection, ScrollNotification, ScrollPhysics, ScrollPositionWithSingleContext, StorageContext,
};

use common::{count, init_tracing, laid_out, layout, RecordingContext, FRAME};

/// Clamping physics with a coarser distance tolerance
#[derive(Debug)]
struct LooseTolerance;

impl PhysicsPolicy for LooseTolerance {
    fn kind(&self) -> PhysicsKind {
        PhysicsKind::Custom("LooseToleranceScrollPhysics")
    }

    fn tolerance(&self, _physics: &ScrollPhysics) -> Tolerance {
        Tolerance::new(0.5, Tolerance::DEFAULT.time, 20.0)
    }
}

/// Test that a drag delta moves the offset and reports exactly one update
#[test]
fn test_drag_delta_reports_single_update() {
    init_tracing();
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::clamping(), context.clone(), 1000.0);

    let mut drag = position
        .lock()
        .unwrap()
        .drag(DragStartDetails::default(), None)
        .unwrap();
    drag.update(DragUpdateDetails::primary(None, -50.0)).unwrap();

    let p = position.lock().unwrap();
    assert_eq!(p.pixels(), Some(50.0));
    assert_eq!(p.user_scroll_direction(), ScrollDirection::Reverse);

    let notifications = context.take();
    let updates: Vec<f64> = notifications
        .iter()
        .filter_map(|n| match n {
            ScrollNotification::Update { scroll_delta, .. } => Some(*scroll_delta),
            _ => None,
        })
        .collect();
    assert_eq!(updates, vec![50.0]);
    assert_eq!(count(&notifications, ScrollNotification::is_overscroll), 0);
}

/// Test that a reversed axis flips drag deltas
#[test]
fn test_reversed_axis_flips_drag_delta() {
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::reversed(scheduler.handle());
    let position = laid_out(ScrollPhysics::clamping(), context, 1000.0);

    let mut drag = position
        .lock()
        .unwrap()
        .drag(DragStartDetails::default(), None)
        .unwrap();
    drag.update(DragUpdateDetails::primary(None, 30.0)).unwrap();

    assert_eq!(position.lock().unwrap().pixels(), Some(30.0));
}

/// Test that jumping twice to the same offset only notifies once
#[test]
fn test_jump_to_same_offset_is_silent() {
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::clamping(), context.clone(), 1000.0);
    let mut p = position.lock().unwrap();

    p.jump_to(300.0).unwrap();
    let first = context.take();
    assert_eq!(first.len(), 3);
    assert!(first[0].is_start());
    assert!(matches!(first[1], ScrollNotification::Update { scroll_delta, .. } if scroll_delta == 300.0));
    assert!(first[2].is_end());

    p.jump_to(300.0).unwrap();
    assert!(context.take().is_empty());
    assert_eq!(p.activity_kind(), Some(ActivityKind::Idle));
}

/// Test that an animation within the physics' distance tolerance jumps instead
#[test]
fn test_animate_within_tolerance_jumps() {
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let physics = ScrollPhysics::new(LooseTolerance).with_parent(ScrollPhysics::clamping());
    assert_eq!(physics.to_string(), "LooseToleranceScrollPhysics -> ClampingScrollPhysics");
    let position = laid_out(physics, context, 1000.0);
    let mut p = position.lock().unwrap();

    p.jump_to(100.0).unwrap();
    let done = p
        .animate_to(100.0001, Duration::from_millis(300), Easing::Ease)
        .unwrap();

    assert!(done.is_complete());
    assert_eq!(p.activity_kind(), Some(ActivityKind::Idle));
    assert_eq!(p.pixels(), Some(100.0001));
}

/// Test that a fling brackets all of its motion with one start and one end
#[test]
fn test_fling_pairs_start_and_end() {
    init_tracing();
    let mut scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::clamping(), context.clone(), 5000.0);

    let mut drag = position
        .lock()
        .unwrap()
        .drag(DragStartDetails::default(), None)
        .unwrap();
    drag.update(DragUpdateDetails::primary(None, -20.0)).unwrap();
    drag.update(DragUpdateDetails::primary(None, -20.0)).unwrap();
    drag.end(DragEndDetails::primary(-2500.0)).unwrap();
    assert_eq!(position.lock().unwrap().activity_kind(), Some(ActivityKind::Ballistic));

    let mut frames = 0;
    while position.lock().unwrap().activity_kind() != Some(ActivityKind::Idle) {
        scheduler.advance(FRAME);
        position.lock().unwrap().tick().unwrap();
        frames += 1;
        assert!(frames < 600, "fling never settled");
    }

    let p = position.lock().unwrap();
    assert!(p.pixels().unwrap() > 40.0);
    assert!(!p.is_scrolling());

    let notifications = context.take();
    assert_eq!(count(&notifications, ScrollNotification::is_start), 1);
    assert_eq!(count(&notifications, ScrollNotification::is_end), 1);
    assert!(notifications.first().is_some_and(ScrollNotification::is_start));
    assert!(notifications
        .iter()
        .rev()
        .find(|n| !matches!(n, ScrollNotification::UserScroll { .. }))
        .is_some_and(ScrollNotification::is_end));

    // Content ignores the pointer only while the fling runs
    assert_eq!(context.ignore_pointer_calls(), vec![true, false]);
}

/// Test that a fling into the end of bouncing content springs back to the extent
#[test]
fn test_bouncing_fling_springs_back() {
    let mut scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::bouncing(), context.clone(), 600.0);

    {
        let mut p = position.lock().unwrap();
        p.jump_to(550.0).unwrap();
        p.go_ballistic(3000.0).unwrap();
    }

    let mut overshoot: f64 = 0.0;
    for _ in 0..600 {
        scheduler.advance(FRAME);
        let mut p = position.lock().unwrap();
        p.tick().unwrap();
        overshoot = overshoot.max(p.pixels().unwrap());
        if p.activity_kind() == Some(ActivityKind::Idle) {
            break;
        }
    }

    let p = position.lock().unwrap();
    assert!(overshoot > 600.0, "bouncing physics should overshoot the end");
    assert!((p.pixels().unwrap() - 600.0).abs() < 1.0);
    assert_eq!(p.activity_kind(), Some(ActivityKind::Idle));
    assert_eq!(count(&context.take(), ScrollNotification::is_overscroll), 0);
}

/// Test that animations settle on the next frame once the scheduler is gone
#[test]
fn test_animation_settles_without_scheduler() {
    init_tracing();
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::clamping(), context, 1000.0);
    drop(scheduler);

    let done = position
        .lock()
        .unwrap()
        .animate_to(500.0, Duration::from_millis(300), Easing::EaseInOut)
        .unwrap();
    assert!(!done.is_complete());

    position.lock().unwrap().tick().unwrap();
    pollster::block_on(done);

    let p = position.lock().unwrap();
    assert_eq!(p.pixels(), Some(500.0));
    assert_eq!(p.activity_kind(), Some(ActivityKind::Idle));
}

/// Test that interrupting an animation resolves its completion
#[test]
fn test_interrupted_animation_resolves() {
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::clamping(), context, 1000.0);
    let mut p = position.lock().unwrap();

    let done = p
        .animate_to(800.0, Duration::from_millis(300), Easing::Linear)
        .unwrap();
    let canceled = Arc::new(AtomicBool::new(false));
    let flag = canceled.clone();
    let hold = p
        .hold(Some(Box::new(move || flag.store(true, Ordering::SeqCst))))
        .unwrap();

    assert!(done.is_complete());
    assert_eq!(p.activity_kind(), Some(ActivityKind::Hold));
    drop(p);

    hold.cancel().unwrap();
    assert!(canceled.load(Ordering::SeqCst));
    assert_eq!(position.lock().unwrap().activity_kind(), Some(ActivityKind::Idle));
}

/// Test that a stale drag handle is ignored once another gesture took over
#[test]
fn test_stale_drag_handle_is_ignored() {
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::clamping(), context, 1000.0);

    let mut first = position
        .lock()
        .unwrap()
        .drag(DragStartDetails::default(), None)
        .unwrap();
    let mut second = position
        .lock()
        .unwrap()
        .drag(DragStartDetails::default(), None)
        .unwrap();

    first.update(DragUpdateDetails::primary(None, -100.0)).unwrap();
    assert_eq!(position.lock().unwrap().pixels(), Some(0.0));

    second.update(DragUpdateDetails::primary(None, -100.0)).unwrap();
    assert_eq!(position.lock().unwrap().pixels(), Some(100.0));
}

/// Test that the offset is restored from page storage when a view is rebuilt
#[test]
fn test_page_storage_restores_offset() {
    let scheduler = AnimationScheduler::new();
    let bucket = Arc::new(PageStorageBucket::new());
    let key = PageStorageKey::new("settings").child("scroll");
    let context = RecordingContext::with_storage(scheduler.handle(), StorageContext::new(bucket.clone(), key.clone()));

    let position = laid_out(ScrollPhysics::clamping(), context.clone(), 1000.0);
    position.lock().unwrap().jump_to(420.0).unwrap();
    assert_eq!(bucket.read_state(&key), Some(420.0));
    position.lock().unwrap().dispose();

    let rebuilt = ScrollPositionWithSingleContext::new(
        ScrollPhysics::clamping(),
        context.clone(),
        PositionOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(rebuilt.lock().unwrap().pixels(), Some(420.0));

    // Without keep_scroll_offset the stored value is ignored
    let fresh = ScrollPositionWithSingleContext::new(
        ScrollPhysics::clamping(),
        context,
        PositionOptions {
            keep_scroll_offset: false,
            ..PositionOptions::default()
        },
        None,
    )
    .unwrap();
    assert_eq!(fresh.lock().unwrap().pixels(), Some(0.0));
}

/// Test that a drag in flight keeps working after its position is replaced
#[test]
fn test_absorb_keeps_drag_alive() {
    let scheduler = AnimationScheduler::new();
    let old_context = RecordingContext::new(scheduler.handle());
    let old = laid_out(ScrollPhysics::clamping(), old_context.clone(), 1000.0);

    let mut drag = old
        .lock()
        .unwrap()
        .drag(DragStartDetails::default(), None)
        .unwrap();
    drag.update(DragUpdateDetails::primary(None, -40.0)).unwrap();
    old_context.take();

    let new_context = RecordingContext::new(scheduler.handle());
    let replacement = ScrollPositionWithSingleContext::new(
        ScrollPhysics::clamping(),
        new_context.clone(),
        PositionOptions::default(),
        Some(&old),
    )
    .unwrap();
    {
        let p = replacement.lock().unwrap();
        assert_eq!(p.pixels(), Some(40.0));
        assert_eq!(p.activity_kind(), Some(ActivityKind::Drag));
        assert!(p.is_scrolling());
    }
    assert_eq!(old.lock().unwrap().activity_kind(), None);
    drop(old);

    drag.update(DragUpdateDetails::primary(None, -10.0)).unwrap();
    assert_eq!(replacement.lock().unwrap().pixels(), Some(50.0));
    assert!(old_context.take().is_empty());
    assert_eq!(count(&new_context.take(), ScrollNotification::is_update), 1);
}

/// Test that absorbing into different physics restarts a running fling
#[test]
fn test_absorb_with_new_physics_restarts_fling() {
    let mut scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let old = laid_out(ScrollPhysics::bouncing(), context.clone(), 10_000.0);
    old.lock().unwrap().go_ballistic(1500.0).unwrap();
    scheduler.advance(FRAME);
    old.lock().unwrap().tick().unwrap();

    let replacement = ScrollPositionWithSingleContext::new(
        ScrollPhysics::clamping(),
        context,
        PositionOptions::default(),
        Some(&old),
    )
    .unwrap();
    layout(&replacement, 10_000.0);

    let p = replacement.lock().unwrap();
    assert_eq!(p.activity_kind(), Some(ActivityKind::Ballistic));
    assert!(p.activity().is_some_and(|activity| activity.velocity() > 0.0));
}

/// Test that content smaller than the viewport cannot be dragged without
/// always-scrollable physics
#[test]
fn test_can_drag_follows_physics() {
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    laid_out(ScrollPhysics::clamping(), context.clone(), 0.0);
    assert_eq!(context.can_drag(), Some(false));

    let context = RecordingContext::new(scheduler.handle());
    let physics = ScrollPhysics::always_scrollable().apply_to(Some(&ScrollPhysics::clamping()));
    laid_out(physics, context.clone(), 0.0);
    assert_eq!(context.can_drag(), Some(true));

    let context = RecordingContext::new(scheduler.handle());
    laid_out(ScrollPhysics::never_scrollable(), context.clone(), 1000.0);
    assert_eq!(context.can_drag(), Some(false));
}
