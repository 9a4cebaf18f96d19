//! Blinc Core Runtime
//!
//! This crate provides the foundational primitives shared by the Blinc
//! scrolling and animation crates:
//!
//! - **Listenable values**: `ChangeNotifier` / `ValueNotifier` with
//!   re-entrancy safe notification
//! - **Drag events**: the details a drag recognizer hands to scrollables
//!
//! # Example
//!
//! ```rust
//! use blinc_core::notifier::ChangeNotifier;
//!
//! let offsets = ChangeNotifier::<f64>::new();
//! let id = offsets.add_listener(|pixels| println!("scrolled to {pixels}"));
//! offsets.notify(&120.0);
//! offsets.remove_listener(id);
//! ```

pub mod events;
pub mod notifier;
pub mod sync;

pub use events::{Drag, DragDetails, DragEndDetails, DragStartDetails, DragUpdateDetails, Offset};
pub use notifier::{ChangeNotifier, ListenerId, ValueNotifier};
pub use sync::lock;
