//! Single-assignment, multi-waiter settlement cell.
//!
//! [`Deferred`] is the unit of composition for fetch deduplication: every
//! caller that needs a page already being fetched attaches a waiter to the
//! same cell, and the one physical fetch settles all of them at once.
//!
//! # Settlement semantics
//!
//! - `resolve`/`reject` settle the cell exactly once; later calls are
//!   idempotent no-ops and report that they did not settle.
//! - Any number of waiters may be registered before or after settlement,
//!   and **every waiter receives a clone of the original settlement**.
//!   Combinators applied to one waiter never alter what other waiters
//!   observe. Dedup fan-out depends on this; do not replace the cell with
//!   a single-consumer channel.
//! - Waiters are woken through the executor, never invoked from inside
//!   `resolve`/`reject`, so settling cannot reenter the settling caller's
//!   stack. A waiter polling an already-settled cell completes on its own
//!   task's next poll.
//! - `cancel()` settles as `Err(CacheError::Canceled)`; a canceled cell
//!   can never later settle successfully.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll, Waker};

use crate::error::{CacheError, Result};

enum State<T> {
    Pending(Vec<Waker>),
    Settled(Result<T>),
}

/// A shareable settlement cell. Cloning shares the same cell.
pub struct Deferred<T> {
    shared: Arc<Mutex<State<T>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Deferred<T> {
    /// Create an unsettled cell.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(State::Pending(Vec::new()))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // Settlement never panics while holding the lock; recover anyway.
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn settle(&self, outcome: Result<T>) -> bool {
        let wakers = {
            let mut state = self.lock();
            match &mut *state {
                State::Pending(wakers) => {
                    let wakers = std::mem::take(wakers);
                    *state = State::Settled(outcome);
                    wakers
                }
                State::Settled(_) => return false,
            }
        };
        for waker in wakers {
            waker.wake();
        }
        true
    }

    /// Settle successfully. Returns whether this call settled the cell.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settle as a failure. Returns whether this call settled the cell.
    pub fn reject(&self, error: CacheError) -> bool {
        self.settle(Err(error))
    }

    /// Settle as `Err(CacheError::Canceled)`.
    ///
    /// Returns whether this call settled the cell; after a successful
    /// cancel, no later `resolve` can land.
    pub fn cancel(&self) -> bool {
        self.settle(Err(CacheError::Canceled))
    }

    /// Whether the cell has settled (in any way).
    pub fn is_settled(&self) -> bool {
        matches!(&*self.lock(), State::Settled(_))
    }

    /// Register a waiter. Each returned future yields a clone of the
    /// settlement, whenever it happens.
    pub fn wait(&self) -> Settled<T> {
        Settled {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Future returned by [`Deferred::wait`].
pub struct Settled<T> {
    shared: Arc<Mutex<State<T>>>,
}

impl<T: Clone> Future for Settled<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.lock().unwrap_or_else(|e| e.into_inner());
        match &mut *state {
            State::Settled(outcome) => Poll::Ready(outcome.clone()),
            State::Pending(wakers) => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}
