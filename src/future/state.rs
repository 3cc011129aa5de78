//! The completion state machine shared by every handle to one future.
//!
//! A future is `Pending` until its result slot is written, then `Completed`
//! forever. The slot, the listener list and the condition variable all sit
//! behind one per-future lock, so the write, the listener swap and the wakeup
//! of blocked waiters happen as a single step relative to `register` and to
//! the wait loop. Listeners are handed back to the caller and run after the
//! lock is released.

use crate::error::Outcome;
use crate::observability::FailureSink;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::Future;

/// Callback invoked once with the completed future.
pub(crate) type Listener<T> = Box<dyn FnOnce(&Future<T>) + Send + 'static>;

struct Slot<T> {
    outcome: Option<Outcome<T>>,
    listeners: Vec<Listener<T>>,
}

pub(crate) struct State<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
    timeout: Duration,
    /// `created + timeout`; `None` when that overflows `Instant`.
    deadline: Option<Instant>,
    sink: Arc<dyn FailureSink>,
}

impl<T> State<T> {
    pub(crate) fn new(timeout: Duration, sink: Arc<dyn FailureSink>) -> Self {
        let created = Instant::now();
        Self {
            slot: Mutex::new(Slot {
                outcome: None,
                listeners: Vec::new(),
            }),
            ready: Condvar::new(),
            timeout,
            deadline: created.checked_add(timeout),
            sink,
        }
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn sink(&self) -> &Arc<dyn FailureSink> {
        &self.sink
    }

    pub(crate) fn time_left(&self) -> Duration {
        self.deadline
            .map_or(Duration::MAX, |d| d.saturating_duration_since(Instant::now()))
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.time_left().is_zero()
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.slot.lock().outcome.is_some()
    }

    /// Writes `outcome` if the slot is empty.
    ///
    /// Returns the listeners to run when this call won, `None` otherwise.
    pub(crate) fn try_complete(&self, outcome: Outcome<T>) -> Option<Vec<Listener<T>>> {
        let mut slot = self.slot.lock();
        if slot.outcome.is_some() {
            return None;
        }
        slot.outcome = Some(outcome);
        let listeners = std::mem::take(&mut slot.listeners);
        self.ready.notify_all();
        Some(listeners)
    }

    /// Queues `listener` while pending.
    ///
    /// Hands the listener back when the future is already completed; the
    /// caller must then run it.
    pub(crate) fn register(&self, listener: Listener<T>) -> Option<Listener<T>> {
        let mut slot = self.slot.lock();
        if slot.outcome.is_some() {
            return Some(listener);
        }
        slot.listeners.push(listener);
        None
    }

    /// Blocks until completed or until `limit` passes; `None` waits forever.
    ///
    /// Returns whether the future is completed.
    pub(crate) fn wait_until(&self, limit: Option<Instant>) -> bool {
        let mut slot = self.slot.lock();
        while slot.outcome.is_none() {
            match limit {
                None => self.ready.wait(&mut slot),
                Some(limit) => {
                    let now = Instant::now();
                    if now >= limit {
                        return false;
                    }
                    // Spurious wakeups loop back and wait only for what is left.
                    let _ = self.ready.wait_for(&mut slot, limit - now);
                }
            }
        }
        true
    }

    /// Blocks for at most `duration`, never past the deadline.
    pub(crate) fn wait_within(&self, duration: Duration) -> bool {
        let budget = duration.min(self.time_left());
        self.wait_until(Instant::now().checked_add(budget))
    }
}

impl<T: Clone> State<T> {
    pub(crate) fn snapshot(&self) -> Option<Outcome<T>> {
        self.slot.lock().outcome.clone()
    }
}
