//! Scroll error types
//!
//! Almost every variant is a programming error: an operation called in a
//! state where it makes no sense, or a physics policy breaking its contract.
//! They are reported at the call site so the offending caller is obvious.

use thiserror::Error;

use crate::activity::ActivityKind;
use crate::position::PositionId;

/// Scroll-related errors
#[derive(Error, Debug)]
pub enum ScrollError {
    /// `set_pixels` called while the current activity is not scrolling
    #[error("set_pixels() called while the {activity} activity is not scrolling")]
    NotScrolling { activity: ActivityKind },

    /// The position was used after `dispose()`
    #[error("Scroll position {0} was used after being disposed")]
    Disposed(PositionId),

    /// The scroll offset was read before it was established
    #[error("Scroll position has no pixels yet; call correct_pixels() or lay out first")]
    MissingPixels,

    /// Scroll extents or viewport were read before layout
    #[error("Scroll position has no {what} yet; apply viewport and content dimensions first")]
    MissingDimensions { what: &'static str },

    /// A drag event arrived without a value on the scroll axis
    #[error("{what} has no primary axis value")]
    MissingPrimaryAxis { what: &'static str },

    /// Boundary conditions returned more overscroll than the move itself
    #[error(
        "{physics}.apply_boundary_conditions returned invalid overscroll value: \
         moving from {pixels} to {proposed} is a delta of {delta:.1}, \
         but the reported overscroll was {overscroll:.1}"
    )]
    InvalidOverscroll {
        physics: String,
        pixels: f64,
        proposed: f64,
        delta: f64,
        overscroll: f64,
    },

    /// Boundary conditions were asked about a move that changes nothing
    #[error("{physics}.apply_boundary_conditions() was called redundantly: {value} is already the current position")]
    RedundantBoundaryCheck { physics: String, value: f64 },

    /// The position is already attached to this controller
    #[error("ScrollController already has position {0} attached")]
    AlreadyAttached(PositionId),

    /// The position is not attached to this controller
    #[error("ScrollController does not have position {0} attached")]
    NotAttached(PositionId),

    /// A controller operation needs at least one attached position
    #[error("ScrollController not attached to any scroll views")]
    NoClients,

    /// A controller operation needs exactly one attached position
    #[error("ScrollController attached to {0} scroll views")]
    MultipleClients(usize),

    /// Invalid scroll tuning file
    #[error("Invalid scroll configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for scroll operations
pub type Result<T> = std::result::Result<T, ScrollError>;
