//! What a scroll position needs from the view that owns it
//!
//! A [`ScrollContext`] is implemented by the scrollable view. It supplies the
//! axis, a ticker provider for simulations, hit-testing and drag toggles, a
//! sink for notifications, and optionally a slot in a [`PageStorageBucket`]
//! where the offset survives the view being rebuilt.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use blinc_animation::TickerProvider;
use blinc_core::lock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::metrics::AxisDirection;
use crate::notification::ScrollNotification;

pub trait ScrollContext: Send + Sync {
    fn axis_direction(&self) -> AxisDirection;

    /// Provider of the tickers that run ballistic and driven activities
    fn vsync(&self) -> &dyn TickerProvider;

    /// Whether content under the scrollable should stop receiving pointer events
    fn set_ignore_pointer(&self, value: bool);

    /// Whether the view should recognize drags
    fn set_can_drag(&self, value: bool);

    /// Deliver a notification to whoever listens above the view
    fn dispatch_notification(&self, notification: &ScrollNotification);

    /// Where the scroll offset is persisted, if anywhere
    fn storage_context(&self) -> Option<StorageContext> {
        None
    }
}

/// Identifies one scrollable's entry in a [`PageStorageBucket`].
///
/// A path of segments, usually the keys of the views between the bucket's
/// owner and the scrollable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PageStorageKey {
    segments: SmallVec<[String; 4]>,
}

impl PageStorageKey {
    pub fn new(segment: impl Into<String>) -> Self {
        let mut segments = SmallVec::new();
        segments.push(segment.into());
        Self { segments }
    }

    /// This key extended by one more segment
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for PageStorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Offsets persisted across view rebuilds
#[derive(Default)]
pub struct PageStorageBucket {
    offsets: Mutex<FxHashMap<PageStorageKey, f64>>,
}

impl PageStorageBucket {
    pub fn new() -> Self {
        Self::default()
    }

    fn offsets(&self) -> MutexGuard<'_, FxHashMap<PageStorageKey, f64>> {
        lock(&self.offsets)
    }

    pub fn write_state(&self, key: &PageStorageKey, offset: f64) {
        self.offsets().insert(key.clone(), offset);
    }

    pub fn read_state(&self, key: &PageStorageKey) -> Option<f64> {
        self.offsets().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.offsets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets().is_empty()
    }
}

impl fmt::Debug for PageStorageBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageStorageBucket")
            .field("entries", &self.len())
            .finish()
    }
}

/// A bucket together with the key of one scrollable in it
#[derive(Clone, Debug)]
pub struct StorageContext {
    pub bucket: Arc<PageStorageBucket>,
    pub key: PageStorageKey,
}

impl StorageContext {
    pub fn new(bucket: Arc<PageStorageBucket>, key: PageStorageKey) -> Self {
        Self { bucket, key }
    }

    pub fn write(&self, offset: f64) {
        self.bucket.write_state(&self.key, offset);
    }

    pub fn read(&self) -> Option<f64> {
        self.bucket.read_state(&self.key)
    }
}

/// Viewport geometry for something that may need to be scrolled into view
pub trait RevealTarget {
    /// Scroll offset that places the target at `alignment` within the
    /// viewport; 0.0 aligns its leading edge, 1.0 its trailing edge
    fn offset_to_reveal(&self, alignment: f64) -> f64;
}

/// A target `extent` long starting at `leading_offset` in scroll coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealRect {
    pub leading_offset: f64,
    pub extent: f64,
    pub viewport_dimension: f64,
}

impl RevealTarget for RevealRect {
    fn offset_to_reveal(&self, alignment: f64) -> f64 {
        self.leading_offset - (self.viewport_dimension - self.extent) * alignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_round_trip() {
        let bucket = Arc::new(PageStorageBucket::new());
        let storage = StorageContext::new(bucket.clone(), PageStorageKey::new("home").child("list"));
        assert_eq!(storage.read(), None);

        storage.write(320.0);
        storage.write(480.0);
        assert_eq!(storage.read(), Some(480.0));
        assert_eq!(bucket.len(), 1);
    }

    #[test]
    fn test_keys_are_paths() {
        let a = PageStorageKey::new("home").child("list");
        let b = PageStorageKey::new("home").child("grid");
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "home/list");
        assert_eq!(a.segments().len(), 2);
    }

    #[test]
    fn test_reveal_rect_alignment() {
        let rect = RevealRect {
            leading_offset: 1000.0,
            extent: 100.0,
            viewport_dimension: 400.0,
        };
        assert_eq!(rect.offset_to_reveal(0.0), 1000.0);
        assert_eq!(rect.offset_to_reveal(1.0), 700.0);
        assert_eq!(rect.offset_to_reveal(0.5), 850.0);
    }
}
