//! Listenable values
//!
//! `ChangeNotifier` keeps a list of listeners that are called with a payload
//! whenever the owner reports a change. `ValueNotifier` wraps a single value
//! and only notifies when the value actually changes.
//!
//! Listeners are stored in a slotmap so that the exact registration can be
//! removed later by its [`ListenerId`]. Notification iterates over a snapshot
//! of the listener list taken before the first call, and the registry lock is
//! not held while a listener runs. A listener may therefore remove itself (or
//! any other listener) while a notification is in progress; removed listeners
//! that have not been reached yet are skipped.
//!
//! # Example
//!
//! ```rust
//! use blinc_core::notifier::ValueNotifier;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let scrolling = ValueNotifier::new(false);
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = hits.clone();
//! scrolling.add_listener(move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! scrolling.set(true);
//! scrolling.set(true); // unchanged, no notification
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::sync::lock;

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

/// Listener callback type
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A list of listeners notified with a `&T` payload
pub struct ChangeNotifier<T> {
    listeners: Mutex<SlotMap<ListenerId, Listener<T>>>,
}

impl<T> ChangeNotifier<T> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Register a listener and return the handle needed to remove it
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        lock(&self.listeners).insert(Arc::new(listener))
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        lock(&self.listeners).remove(id).is_some()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        lock(&self.listeners).contains_key(id)
    }

    pub fn has_listeners(&self) -> bool {
        !lock(&self.listeners).is_empty()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Call every registered listener with `payload`
    pub fn notify(&self, payload: &T) {
        let snapshot: SmallVec<[(ListenerId, Listener<T>); 4]> = lock(&self.listeners)
            .iter()
            .map(|(id, listener)| (id, listener.clone()))
            .collect();

        for (id, listener) in snapshot {
            // Skip listeners removed by an earlier listener in this pass
            if !self.contains(id) {
                continue;
            }
            listener(payload);
        }
    }

    /// Drop every listener
    pub fn clear(&self) {
        lock(&self.listeners).clear();
    }
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// A single observable value
pub struct ValueNotifier<T> {
    value: Mutex<T>,
    notifier: ChangeNotifier<T>,
}

impl<T: Clone + PartialEq> ValueNotifier<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn get(&self) -> T {
        lock(&self.value).clone()
    }

    /// Update the value, notifying listeners only if it changed.
    ///
    /// Returns true if listeners were notified.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = lock(&self.value);
            if *current == value {
                return false;
            }
            *current = value.clone();
        }
        self.notifier.notify(&value);
        true
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.notifier.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }

    pub fn has_listeners(&self) -> bool {
        self.notifier.has_listeners()
    }
}

impl<T: Clone + PartialEq + fmt::Debug> fmt::Debug for ValueNotifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueNotifier")
            .field("value", &self.get())
            .field("listeners", &self.notifier.listener_count())
            .finish()
    }
}
