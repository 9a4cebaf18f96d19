//! Tickers and ticker providers
//!
//! A [`Ticker`] is a stopwatch driven by the
//! [`AnimationScheduler`](crate::scheduler::AnimationScheduler): while it
//! runs, every scheduler frame adds the frame delta to its elapsed time.
//!
//! [`TickerRegistry`] is a composable provider for objects that create
//! tickers on behalf of others. It remembers every ticker it handed out and
//! refuses to be disposed while one of them is still running, which surfaces
//! animations that were never stopped.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use blinc_core::lock;

use crate::error::{AnimationError, Result};
use crate::scheduler::{SchedulerHandle, TickerId};

#[derive(Debug)]
pub(crate) struct TickerClock {
    pub(crate) label: String,
    pub(crate) elapsed: f64,
    pub(crate) active: bool,
}

/// Frame-driven stopwatch
pub struct Ticker {
    id: Option<TickerId>,
    clock: Arc<Mutex<TickerClock>>,
    scheduler: SchedulerHandle,
}

impl Ticker {
    fn new(label: &str, scheduler: SchedulerHandle) -> Self {
        let clock = Arc::new(Mutex::new(TickerClock {
            label: label.to_owned(),
            elapsed: 0.0,
            active: false,
        }));
        let id = scheduler.with_inner(|inner| inner.register(&clock));
        if id.is_none() {
            tracing::debug!(label, "ticker created without a live scheduler");
        }
        Self {
            id,
            clock,
            scheduler,
        }
    }

    /// Start (or restart) from zero elapsed time.
    ///
    /// Fails if the scheduler that would drive this ticker is gone.
    pub fn start(&mut self) -> Result<()> {
        let mut clock = lock(&self.clock);
        if self.id.is_none() || !self.scheduler.is_alive() {
            return Err(AnimationError::SchedulerDropped {
                label: clock.label.clone(),
            });
        }
        clock.elapsed = 0.0;
        clock.active = true;
        Ok(())
    }

    pub fn stop(&mut self) {
        lock(&self.clock).active = false;
    }

    pub fn is_active(&self) -> bool {
        lock(&self.clock).active
    }

    /// Seconds since the last `start`
    pub fn elapsed(&self) -> f64 {
        lock(&self.clock).elapsed
    }

    pub fn label(&self) -> String {
        lock(&self.clock).label.clone()
    }

    fn clock(&self) -> Weak<Mutex<TickerClock>> {
        Arc::downgrade(&self.clock)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.with_inner(|inner| inner.unregister(id));
        }
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clock = lock(&self.clock);
        f.debug_struct("Ticker")
            .field("label", &clock.label)
            .field("elapsed", &clock.elapsed)
            .field("active", &clock.active)
            .finish()
    }
}

/// Something that can hand out tickers
pub trait TickerProvider: Send + Sync {
    fn create_ticker(&self, label: &str) -> Ticker;
}

impl TickerProvider for SchedulerHandle {
    fn create_ticker(&self, label: &str) -> Ticker {
        Ticker::new(label, self.clone())
    }
}

/// Ticker provider with leak detection
pub struct TickerRegistry {
    owner: String,
    scheduler: SchedulerHandle,
    clocks: Mutex<Vec<Weak<Mutex<TickerClock>>>>,
}

impl TickerRegistry {
    pub fn new(owner: impl Into<String>, scheduler: SchedulerHandle) -> Self {
        Self {
            owner: owner.into(),
            scheduler,
            clocks: Mutex::new(Vec::new()),
        }
    }

    /// Tickers handed out by this registry that still exist
    pub fn live_tickers(&self) -> usize {
        let mut clocks = lock(&self.clocks);
        clocks.retain(|clock| clock.strong_count() > 0);
        clocks.len()
    }

    /// Check that every ticker created through this registry has stopped.
    ///
    /// Running tickers are left untouched so the leak stays visible.
    pub fn dispose(&self) -> Result<()> {
        let labels: Vec<String> = lock(&self.clocks)
            .iter()
            .filter_map(Weak::upgrade)
            .filter_map(|clock| {
                let clock = lock(&clock);
                clock.active.then(|| clock.label.clone())
            })
            .collect();

        if labels.is_empty() {
            tracing::debug!(owner = %self.owner, "ticker registry disposed");
            return Ok(());
        }

        tracing::warn!(owner = %self.owner, ?labels, "disposed with active tickers");
        Err(AnimationError::TickerLeak {
            owner: self.owner.clone(),
            active: labels.len(),
            labels,
        })
    }
}

impl TickerProvider for TickerRegistry {
    fn create_ticker(&self, label: &str) -> Ticker {
        let ticker = Ticker::new(label, self.scheduler.clone());
        let mut clocks = lock(&self.clocks);
        clocks.retain(|clock| clock.strong_count() > 0);
        clocks.push(ticker.clock());
        ticker
    }
}

impl fmt::Debug for TickerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickerRegistry")
            .field("owner", &self.owner)
            .field("live_tickers", &self.live_tickers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::AnimationScheduler;

    #[test]
    fn test_start_resets_elapsed() {
        let mut scheduler = AnimationScheduler::new();
        let mut ticker = scheduler.handle().create_ticker("restart");

        ticker.start().unwrap();
        scheduler.advance(0.5);
        assert_eq!(ticker.elapsed(), 0.5);

        ticker.start().unwrap();
        assert_eq!(ticker.elapsed(), 0.0);
    }

    #[test]
    fn test_start_without_scheduler_fails() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        drop(scheduler);

        let mut ticker = handle.create_ticker("orphan");
        assert_eq!(
            ticker.start(),
            Err(AnimationError::SchedulerDropped {
                label: "orphan".to_string()
            })
        );
        assert!(!ticker.is_active());
    }

    #[test]
    fn test_registry_reports_leaked_tickers() {
        let scheduler = AnimationScheduler::new();
        let registry = TickerRegistry::new("ScrollableState", scheduler.handle());

        let mut ticker = registry.create_ticker("ballistic");
        ticker.start().unwrap();

        let err = registry.dispose().unwrap_err();
        assert!(matches!(err, AnimationError::TickerLeak { active: 1, .. }));

        ticker.stop();
        assert!(registry.dispose().is_ok());
    }

    #[test]
    fn test_registry_forgets_dropped_tickers() {
        let scheduler = AnimationScheduler::new();
        let registry = TickerRegistry::new("owner", scheduler.handle());

        let mut ticker = registry.create_ticker("gone");
        ticker.start().unwrap();
        assert_eq!(registry.live_tickers(), 1);
        drop(ticker);

        assert_eq!(registry.live_tickers(), 0);
        assert!(registry.dispose().is_ok());
    }
}
