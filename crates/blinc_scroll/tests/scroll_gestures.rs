//! Integration tests for hold and drag gestures
//!
//! These tests verify that:
//! - A drag that interrupts a fling carries its momentum into the next fling
//! - Momentum is dropped when the pointer rests or the direction reverses
//! - The drag start threshold swallows small movements after a pause
//! - Wheel scrolling stays within the extents

mod common;

use std::time::Duration;

use blinc_animation::AnimationScheduler;
use blinc_core::{Drag, DragEndDetails, DragStartDetails, DragUpdateDetails, Offset};
use blinc_scroll::{ActivityKind, ScrollNotification, ScrollPhysics, SharedScrollPosition};

use common::{laid_out, RecordingContext, FRAME};

fn at(ms: u64) -> Option<Duration> {
    Some(Duration::from_millis(ms))
}

fn start_at(ms: u64) -> DragStartDetails {
    DragStartDetails::new(at(ms), Offset::ZERO)
}

/// Fling, let it run for a frame, then catch it with a hold.
/// Returns the velocity the hold interrupted.
fn fling_and_catch(position: &SharedScrollPosition, scheduler: &mut AnimationScheduler, velocity: f64) -> f64 {
    position.lock().unwrap().go_ballistic(velocity).unwrap();
    scheduler.advance(FRAME);
    position.lock().unwrap().tick().unwrap();

    let mut p = position.lock().unwrap();
    let interrupted = p.activity().map_or(0.0, |activity| activity.velocity());
    let _hold = p.hold(None).unwrap();
    assert_eq!(p.held_previous_velocity(), interrupted);
    interrupted
}

fn ballistic_velocity(position: &SharedScrollPosition) -> f64 {
    let p = position.lock().unwrap();
    assert_eq!(p.activity_kind(), Some(ActivityKind::Ballistic));
    p.activity().map_or(0.0, |activity| activity.velocity())
}

/// Test that a quick second fling adds the momentum of the first
#[test]
fn test_drag_retains_momentum_of_interrupted_fling() {
    let mut scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let physics = ScrollPhysics::bouncing();
    let position = laid_out(physics.clone(), context, 100_000.0);

    let interrupted = fling_and_catch(&position, &mut scheduler, 2000.0);
    assert!(interrupted > 0.0);
    let carried = physics.carried_momentum(interrupted);

    let mut drag = position.lock().unwrap().drag(start_at(100), None).unwrap();
    drag.update(DragUpdateDetails::primary(at(110), -8.0)).unwrap();
    drag.update(DragUpdateDetails::primary(at(120), -8.0)).unwrap();
    drag.end(DragEndDetails::primary(-1500.0)).unwrap();

    let expected = (1500.0 + carried) * 0.91;
    assert!((ballistic_velocity(&position) - expected).abs() < 1e-6);
}

/// Test that a fling against the interrupted one does not inherit its momentum
#[test]
fn test_reversed_fling_drops_momentum() {
    let mut scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::bouncing(), context, 100_000.0);
    position.lock().unwrap().jump_to(50_000.0).unwrap();

    fling_and_catch(&position, &mut scheduler, 2000.0);

    let mut drag = position.lock().unwrap().drag(start_at(100), None).unwrap();
    drag.update(DragUpdateDetails::primary(at(110), 8.0)).unwrap();
    drag.end(DragEndDetails::primary(1500.0)).unwrap();

    assert!((ballistic_velocity(&position) - (-1500.0 * 0.91)).abs() < 1e-6);
}

/// Test that resting the pointer before moving drops the carried momentum
#[test]
fn test_resting_pointer_drops_momentum() {
    let mut scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::bouncing(), context, 100_000.0);

    fling_and_catch(&position, &mut scheduler, 2000.0);

    let mut drag = position.lock().unwrap().drag(start_at(100), None).unwrap();
    // Stationary for longer than the retain threshold
    drag.update(DragUpdateDetails::primary(at(150), 0.0)).unwrap();
    drag.update(DragUpdateDetails::primary(at(160), -8.0)).unwrap();
    drag.end(DragEndDetails::primary(-1500.0)).unwrap();

    assert!((ballistic_velocity(&position) - 1500.0 * 0.91).abs() < 1e-6);
}

/// Test that the start threshold swallows small movements, then eases in
#[test]
fn test_start_threshold_after_rest() {
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::bouncing(), context, 1000.0);
    let pixels = || position.lock().unwrap().pixels().unwrap();

    let mut drag = position.lock().unwrap().drag(start_at(0), None).unwrap();
    drag.update(DragUpdateDetails::primary(at(10), -2.0)).unwrap();
    assert_eq!(pixels(), 0.0);

    // Crossing the 3.5 threshold moves by a third of it at most
    drag.update(DragUpdateDetails::primary(at(20), -2.0)).unwrap();
    assert!((pixels() - 3.5 / 3.0).abs() < 1e-9);

    // Past the threshold deltas pass straight through
    drag.update(DragUpdateDetails::primary(at(30), -2.0)).unwrap();
    assert!((pixels() - (3.5 / 3.0 + 2.0)).abs() < 1e-9);

    // Resting re-arms the threshold
    drag.update(DragUpdateDetails::primary(at(200), 0.0)).unwrap();
    let rested = pixels();
    drag.update(DragUpdateDetails::primary(at(210), -1.0)).unwrap();
    assert_eq!(pixels(), rested);

    // A big jump breaks through untouched
    drag.update(DragUpdateDetails::primary(at(220), -40.0)).unwrap();
    assert!((pixels() - (rested + 40.0)).abs() < 1e-9);
}

/// Test that wheel deltas bypass the threshold and stay within the extents
#[test]
fn test_wheel_scroll_is_clamped() {
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::bouncing(), context.clone(), 1000.0);

    let mut drag = position
        .lock()
        .unwrap()
        .drag(DragStartDetails::default(), None)
        .unwrap();
    drag.update(DragUpdateDetails::scroll(-2.0)).unwrap();
    assert_eq!(position.lock().unwrap().pixels(), Some(2.0));

    drag.update(DragUpdateDetails::scroll(-5000.0)).unwrap();
    assert_eq!(position.lock().unwrap().pixels(), Some(1000.0));

    drag.update(DragUpdateDetails::scroll(0.0)).unwrap();
    assert_eq!(position.lock().unwrap().pixels(), Some(1000.0));

    let notifications = context.take();
    assert!(notifications
        .iter()
        .all(|n| !matches!(n, ScrollNotification::Overscroll { .. })));
}

/// Test that a drag dragged past the start rubber-bands on bouncing physics
#[test]
fn test_bouncing_drag_past_start_is_damped() {
    let scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::bouncing(), context, 1000.0);

    let mut drag = position
        .lock()
        .unwrap()
        .drag(DragStartDetails::default(), None)
        .unwrap();
    drag.update(DragUpdateDetails::primary(None, 40.0)).unwrap();
    let first = position.lock().unwrap().pixels().unwrap();
    assert_eq!(first, -40.0);

    // Out of range now, so the next delta is damped
    drag.update(DragUpdateDetails::primary(None, 40.0)).unwrap();
    let second = position.lock().unwrap().pixels().unwrap();
    assert!(second < first);
    assert!(first - second < 40.0);
}

/// Test that canceling a drag lets the position settle back in range
#[test]
fn test_cancel_drag_settles() {
    let mut scheduler = AnimationScheduler::new();
    let context = RecordingContext::new(scheduler.handle());
    let position = laid_out(ScrollPhysics::bouncing(), context, 1000.0);

    let mut drag = position
        .lock()
        .unwrap()
        .drag(DragStartDetails::default(), None)
        .unwrap();
    drag.update(DragUpdateDetails::primary(None, 60.0)).unwrap();
    drag.cancel().unwrap();
    assert_eq!(position.lock().unwrap().activity_kind(), Some(ActivityKind::Ballistic));

    for _ in 0..600 {
        scheduler.advance(FRAME);
        let mut p = position.lock().unwrap();
        p.tick().unwrap();
        if p.activity_kind() == Some(ActivityKind::Idle) {
            break;
        }
    }
    let p = position.lock().unwrap();
    assert_eq!(p.activity_kind(), Some(ActivityKind::Idle));
    assert!(p.pixels().unwrap().abs() < 1.0);
}
