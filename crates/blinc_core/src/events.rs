//! Drag gesture events
//!
//! Details delivered by a drag recognizer to whatever is driven by the drag.
//! Recognition itself (slop, arena, velocity tracking) happens upstream; by
//! the time these values exist the gesture has been accepted and reduced to
//! a single primary axis.

use std::fmt;
use std::time::Duration;

/// A 2D offset in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn distance(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

/// A drag has been accepted and is about to move
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragStartDetails {
    /// Timestamp of the pointer event that started the drag
    pub source_time_stamp: Option<Duration>,
    /// Pointer position in global coordinates
    pub global_position: Offset,
}

impl DragStartDetails {
    pub fn new(source_time_stamp: Option<Duration>, global_position: Offset) -> Self {
        Self {
            source_time_stamp,
            global_position,
        }
    }
}

/// The pointer moved during a drag
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragUpdateDetails {
    /// Timestamp of the pointer event
    pub source_time_stamp: Option<Duration>,
    /// Movement since the previous update
    pub delta: Offset,
    /// Movement along the recognizer's primary axis, if it has one
    pub primary_delta: Option<f64>,
    /// Pointer position in global coordinates
    pub global_position: Offset,
    /// True when the delta comes from a discrete scroll device (mouse wheel)
    /// rather than a pointer being dragged
    pub is_scroll: bool,
}

impl DragUpdateDetails {
    /// Update along a single axis
    pub fn primary(source_time_stamp: Option<Duration>, primary_delta: f64) -> Self {
        Self {
            source_time_stamp,
            delta: Offset::new(0.0, primary_delta),
            primary_delta: Some(primary_delta),
            global_position: Offset::ZERO,
            is_scroll: false,
        }
    }

    /// Wheel-style scroll update along a single axis
    pub fn scroll(primary_delta: f64) -> Self {
        Self {
            is_scroll: true,
            ..Self::primary(None, primary_delta)
        }
    }
}

/// The pointer was released
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragEndDetails {
    /// Release velocity in logical pixels per second
    pub velocity: Offset,
    /// Release velocity along the primary axis, if the recognizer has one
    pub primary_velocity: Option<f64>,
}

impl DragEndDetails {
    pub fn primary(primary_velocity: f64) -> Self {
        Self {
            velocity: Offset::new(0.0, primary_velocity),
            primary_velocity: Some(primary_velocity),
        }
    }
}

/// The last details a drag saw
#[derive(Clone, Debug, PartialEq)]
pub enum DragDetails {
    Start(DragStartDetails),
    Update(DragUpdateDetails),
    End(DragEndDetails),
}

impl fmt::Display for DragDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragDetails::Start(d) => write!(f, "DragStartDetails({:?})", d.global_position),
            DragDetails::Update(d) => write!(f, "DragUpdateDetails({:?})", d.primary_delta),
            DragDetails::End(d) => write!(f, "DragEndDetails({:?})", d.primary_velocity),
        }
    }
}

/// Something a drag recognizer can drive
pub trait Drag {
    type Error;

    /// The pointer moved
    fn update(&mut self, details: DragUpdateDetails) -> Result<(), Self::Error>;

    /// The pointer was released
    fn end(&mut self, details: DragEndDetails) -> Result<(), Self::Error>;

    /// The gesture was abandoned before completion
    fn cancel(&mut self) -> Result<(), Self::Error>;
}
