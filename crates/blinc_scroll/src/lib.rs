//! Blinc Scroll Core
//!
//! Scroll offsets, physics and activities for Blinc scrollables.
//!
//! # Features
//!
//! - **Physics chains**: composable [`ScrollPhysics`] policies (bouncing,
//!   clamping, always/never scrollable) that decide boundary behavior,
//!   rubber-band resistance and fling simulations
//! - **Activities**: idle, hold, drag, ballistic and driven states, each
//!   owned by exactly one position
//! - **Positions**: [`ScrollPositionWithSingleContext`] holds the offset and
//!   extents, performs activity requests and emits scroll notifications
//! - **Controllers**: [`ScrollController`] fans jumps and animations out to
//!   every attached position; [`TrackingScrollController`] remembers the
//!   last one the user moved
//!
//! # Frames
//!
//! Nothing here runs on its own. Each frame the host advances the
//! [`blinc_animation::AnimationScheduler`] and then calls
//! [`ScrollPositionWithSingleContext::tick`] on its positions.
//!
//! # Example
//!
//! ```ignore
//! let position = controller.create_scroll_position(ScrollPhysics::bouncing(), context, None)?;
//! controller.attach(&position)?;
//!
//! let mut drag = position.lock().unwrap().drag(details, None)?;
//! drag.update(DragUpdateDetails::primary(None, -40.0))?;
//! drag.end(DragEndDetails::primary(-1200.0))?;
//!
//! scheduler.advance(1.0 / 60.0);
//! position.lock().unwrap().tick()?;
//! ```

pub mod activity;
pub mod config;
pub mod context;
pub mod controller;
pub mod drag;
pub mod error;
pub mod metrics;
pub mod notification;
pub mod physics;
pub mod position;
pub mod position_with_single_context;
pub mod simulation;

pub use activity::{
    ActivityKind, ActivityRequest, BallisticScrollActivity, CancelCallback, DragScrollActivity,
    DrivenScrollActivity, HoldScrollActivity, IdleScrollActivity, ScrollActivity, ScrollActivityDelegate,
};
pub use config::{BouncingConfig, ClampingConfig, DragConfig, ScrollConfig};
pub use context::{PageStorageBucket, PageStorageKey, RevealRect, RevealTarget, ScrollContext, StorageContext};
pub use controller::{ScrollController, TrackingScrollController};
pub use drag::{GestureId, ScrollDragController, ScrollDragHandle, ScrollHoldHandle};
pub use error::{Result, ScrollError};
pub use metrics::{Axis, AxisDirection, ScrollDirection, ScrollMetrics};
pub use notification::ScrollNotification;
pub use physics::{
    AlwaysScrollablePolicy, BouncingPolicy, ClampingPolicy, NeverScrollablePolicy, PhysicsKind, PhysicsPolicy,
    ScrollPhysics,
};
pub use position::{PositionId, ScrollPosition};
pub use position_with_single_context::{PositionOptions, ScrollPositionWithSingleContext, SharedScrollPosition};
pub use simulation::{BouncingScrollSimulation, ClampingScrollSimulation};
