//! Animation scheduler
//!
//! Owns the frame clock. Every [`Ticker`](crate::ticker::Ticker) registers a
//! clock here; each frame the scheduler advances the elapsed time of every
//! running ticker. Nothing is called back from inside the scheduler: the
//! host advances the scheduler first and then lets each animated object read
//! its ticker and update itself.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

use blinc_core::lock;
use slotmap::{new_key_type, SlotMap};

use crate::ticker::TickerClock;

new_key_type! {
    pub struct TickerId;
}

pub(crate) struct SchedulerInner {
    tickers: SlotMap<TickerId, Weak<Mutex<TickerClock>>>,
    frame_count: u64,
}

impl SchedulerInner {
    pub(crate) fn register(&mut self, clock: &Arc<Mutex<TickerClock>>) -> TickerId {
        self.tickers.insert(Arc::downgrade(clock))
    }

    pub(crate) fn unregister(&mut self, id: TickerId) -> bool {
        self.tickers.remove(id).is_some()
    }
}

/// The animation scheduler that advances all tickers
pub struct AnimationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
    last_frame: Instant,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                tickers: SlotMap::with_key(),
                frame_count: 0,
            })),
            last_frame: Instant::now(),
        }
    }

    /// Get a weak handle for creating tickers.
    ///
    /// Handles outlive the scheduler safely; tickers created from a dead
    /// handle never start.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Advance by the wall-clock time since the previous frame.
    ///
    /// Returns true if any ticker is still running.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.advance(dt)
    }

    /// Advance every running ticker by `dt` seconds.
    ///
    /// Returns true if any ticker is still running.
    pub fn advance(&mut self, dt: f64) -> bool {
        let mut inner = lock(&self.inner);
        inner.frame_count += 1;

        // Tickers that were dropped without unregistering
        inner.tickers.retain(|_, clock| clock.strong_count() > 0);

        let mut active = 0usize;
        for (_, clock) in inner.tickers.iter() {
            if let Some(clock) = clock.upgrade() {
                let mut clock = lock(&clock);
                if clock.active {
                    clock.elapsed += dt;
                    active += 1;
                }
            }
        }

        tracing::trace!(frame = inner.frame_count, dt, active, "animation frame");
        active > 0
    }

    /// Check if any tickers are still running
    pub fn has_active_animations(&self) -> bool {
        lock(&self.inner)
            .tickers
            .values()
            .filter_map(Weak::upgrade)
            .any(|clock| lock(&clock).active)
    }

    /// Number of registered tickers, running or not
    pub fn ticker_count(&self) -> usize {
        lock(&self.inner).tickers.len()
    }

    pub fn frame_count(&self) -> u64 {
        lock(&self.inner).frame_count
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("tickers", &self.ticker_count())
            .field("frame_count", &self.frame_count())
            .finish()
    }
}

/// Weak reference to an [`AnimationScheduler`]
#[derive(Clone, Default)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// A handle that is not connected to any scheduler
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub(crate) fn with_inner<R>(&self, f: impl FnOnce(&mut SchedulerInner) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let mut guard = lock(&inner);
        Some(f(&mut guard))
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
