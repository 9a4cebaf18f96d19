//! Scroll notifications
//!
//! Dispatched through [`ScrollContext::dispatch_notification`] as a position
//! moves. Each one carries a metrics snapshot taken when it was built.
//!
//! [`ScrollContext::dispatch_notification`]: crate::context::ScrollContext::dispatch_notification

use std::fmt;

use blinc_core::{DragEndDetails, DragStartDetails, DragUpdateDetails};

use crate::metrics::{ScrollDirection, ScrollMetrics};

#[derive(Clone, Debug, PartialEq)]
pub enum ScrollNotification {
    /// The position started scrolling
    Start {
        metrics: ScrollMetrics,
        /// Set when the scroll was started by a drag
        drag_details: Option<DragStartDetails>,
    },
    /// The offset changed
    Update {
        metrics: ScrollMetrics,
        scroll_delta: f64,
        drag_details: Option<DragUpdateDetails>,
    },
    /// Boundary conditions refused part of a move
    Overscroll {
        metrics: ScrollMetrics,
        overscroll: f64,
        /// Velocity of the simulation at the time, zero for drags
        velocity: f64,
        drag_details: Option<DragUpdateDetails>,
    },
    /// The position stopped scrolling
    End {
        metrics: ScrollMetrics,
        drag_details: Option<DragEndDetails>,
    },
    /// The user scroll direction changed
    UserScroll {
        metrics: ScrollMetrics,
        direction: ScrollDirection,
    },
}

impl ScrollNotification {
    pub fn metrics(&self) -> &ScrollMetrics {
        match self {
            ScrollNotification::Start { metrics, .. }
            | ScrollNotification::Update { metrics, .. }
            | ScrollNotification::Overscroll { metrics, .. }
            | ScrollNotification::End { metrics, .. }
            | ScrollNotification::UserScroll { metrics, .. } => metrics,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, ScrollNotification::Start { .. })
    }

    pub fn is_end(&self) -> bool {
        matches!(self, ScrollNotification::End { .. })
    }

    pub fn is_update(&self) -> bool {
        matches!(self, ScrollNotification::Update { .. })
    }

    pub fn is_overscroll(&self) -> bool {
        matches!(self, ScrollNotification::Overscroll { .. })
    }
}

impl fmt::Display for ScrollNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollNotification::Start { metrics, drag_details } => {
                write!(f, "ScrollStartNotification({metrics}")?;
                if drag_details.is_some() {
                    write!(f, ", drag")?;
                }
                write!(f, ")")
            }
            ScrollNotification::Update {
                metrics,
                scroll_delta,
                ..
            } => write!(f, "ScrollUpdateNotification({metrics}, scrollDelta: {scroll_delta:.1})"),
            ScrollNotification::Overscroll {
                metrics,
                overscroll,
                velocity,
                ..
            } => write!(
                f,
                "OverscrollNotification({metrics}, overscroll: {overscroll:.1}, velocity: {velocity:.1})"
            ),
            ScrollNotification::End { metrics, .. } => write!(f, "ScrollEndNotification({metrics})"),
            ScrollNotification::UserScroll { metrics, direction } => {
                write!(f, "UserScrollNotification({metrics}, direction: {direction})")
            }
        }
    }
}
