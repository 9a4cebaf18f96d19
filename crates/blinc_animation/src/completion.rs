//! One-shot completion signals
//!
//! A [`Completer`] is held by whoever drives an animation; the matching
//! [`Completion`] is handed to callers. A completion resolves exactly once,
//! when the animation finishes or is superseded. It can be awaited as a
//! `Future` or observed with a callback.
//!
//! Dropping a `Completer` without calling [`Completer::complete`] resolves
//! the completion too, so an animation torn down mid-flight never leaves a
//! caller waiting forever.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use blinc_core::lock;

type Callback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct CompletionState {
    done: bool,
    wakers: Vec<Waker>,
    callbacks: Vec<Callback>,
}

fn resolve(state: &Mutex<CompletionState>) {
    let (wakers, callbacks) = {
        let mut state = lock(state);
        if state.done {
            return;
        }
        state.done = true;
        (
            std::mem::take(&mut state.wakers),
            std::mem::take(&mut state.callbacks),
        )
    };
    for waker in wakers {
        waker.wake();
    }
    for callback in callbacks {
        callback();
    }
}

/// The resolving half
pub struct Completer {
    state: Arc<Mutex<CompletionState>>,
}

impl Completer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CompletionState::default())),
        }
    }

    /// A completion that resolves when this completer does
    pub fn completion(&self) -> Completion {
        Completion {
            state: self.state.clone(),
        }
    }

    pub fn complete(self) {
        resolve(&self.state);
    }
}

impl Default for Completer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Completer {
    fn drop(&mut self) {
        resolve(&self.state);
    }
}

impl fmt::Debug for Completer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("done", &lock(&self.state).done)
            .finish()
    }
}

/// The observing half; cheap to clone
#[derive(Clone)]
pub struct Completion {
    state: Arc<Mutex<CompletionState>>,
}

impl Completion {
    /// A completion that has already resolved
    pub fn resolved() -> Self {
        let state = CompletionState {
            done: true,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn is_complete(&self) -> bool {
        lock(&self.state).done
    }

    /// Run `callback` once this completion resolves.
    ///
    /// Runs immediately if it already has.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = lock(&self.state);
            if !state.done {
                state.callbacks.push(Box::new(callback));
                return;
            }
        }
        callback();
    }

    /// A completion that resolves once every one of `completions` has
    pub fn all<I>(completions: I) -> Completion
    where
        I: IntoIterator<Item = Completion>,
    {
        let completions: Vec<Completion> = completions.into_iter().collect();
        if completions.is_empty() {
            return Completion::resolved();
        }

        let completer = Completer::new();
        let all = completer.completion();
        let remaining = Arc::new(AtomicUsize::new(completions.len()));
        let completer = Arc::new(Mutex::new(Some(completer)));

        for completion in completions {
            let remaining = remaining.clone();
            let completer = completer.clone();
            completion.on_complete(move || {
                if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    if let Some(completer) = lock(&completer).take() {
                        completer.complete();
                    }
                }
            });
        }
        all
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = lock(&self.state);
        if state.done {
            return Poll::Ready(());
        }
        if !state.wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
            state.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("done", &self.is_complete())
            .finish()
    }
}
