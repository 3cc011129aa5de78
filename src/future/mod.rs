//! Completable futures: one-shot, thread-safe result delivery.
//!
//! A producer holds a [`CompletableFuture`] and eventually calls
//! [`complete`](CompletableFuture::complete) with a value or an error.
//! Consumers hold the read-only [`Future`] view and either register
//! callbacks with [`on_complete`](Future::on_complete) or block in
//! [`wait`](Future::wait) until the result arrives or the deadline passes.
//!
//! # Guarantees
//!
//! - The result slot is written at most once; later completions are no-ops
//! - Every listener runs exactly once with the final state, whether it was
//!   registered before or after completion
//! - Listeners run on the completing thread, after the lock is released, in
//!   registration order
//! - The deadline is fixed at construction (`created + timeout`)
//!
//! Timeouts bound only how long a caller blocks. They never complete the
//! future and never stop the producer: an expired future may still receive
//! a result later.
//!
//! # Example
//!
//! ```
//! use promissory::CompletableFuture;
//! use std::time::Duration;
//!
//! let promise = CompletableFuture::with_timeout(Duration::from_secs(1));
//! let doubled = promise.future().map(|v: u32| v * 2);
//!
//! std::thread::spawn(move || {
//!     promise.complete_with_result(21);
//! });
//!
//! assert_eq!(doubled.get().unwrap(), 42);
//! ```

mod spawn;
mod state;
mod transform;

pub use spawn::{spawn, spawn_with_sink};
pub(crate) use transform::guarded;

use crate::config::{FutureConfig, DEFAULT_TIMEOUT};
use crate::error::{Error, ErrorKind, Outcome, Result};
use crate::observability::{default_sink, FailureSink};
use state::{Listener, State};
use std::fmt;
use std::ops::Deref;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Read-only handle to an eventually available result.
///
/// Cloning is cheap and every clone refers to the same future.
pub struct Future<T> {
    state: Arc<State<T>>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("completed", &self.is_completed())
            .field("timeout", &self.timeout())
            .field("expired", &self.is_expired())
            .finish()
    }
}

impl<T> Future<T> {
    /// The timeout this future was created with.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.state.timeout()
    }

    /// The absolute deadline, or `None` if the timeout is too large to represent.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.state.deadline()
    }

    /// Time remaining until the deadline, zero once it has passed.
    #[must_use]
    pub fn time_left(&self) -> Duration {
        self.state.time_left()
    }

    /// Returns true once the deadline has passed.
    ///
    /// This is a pure clock check: a completed future can be expired too.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state.is_expired()
    }

    /// Returns true once a result or failure has been recorded.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    /// Returns true if both handles refer to the same future.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// The failure sink this future reports to.
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn FailureSink> {
        self.state.sink()
    }

    /// Blocks until completed or until the deadline passes.
    ///
    /// Fails with [`ErrorKind::Timeout`] if the deadline passes first. The
    /// future itself stays pending and can still be completed later.
    pub fn wait(&self) -> Result<&Self> {
        if self.state.wait_until(self.state.deadline()) {
            Ok(self)
        } else {
            tracing::warn!(timeout_ms = self.timeout().as_millis(), "future wait timed out");
            Err(Error::timeout(self.timeout()))
        }
    }

    /// Blocks until completed, ignoring the deadline.
    pub fn wait_blocking(&self) -> &Self {
        self.state.wait_until(None);
        self
    }
}

impl<T: Clone> Future<T> {
    /// Non-blocking snapshot of the outcome.
    #[must_use]
    pub fn value(&self) -> Option<Outcome<T>> {
        self.state.snapshot()
    }

    /// The success value, if completed successfully.
    #[must_use]
    pub fn result(&self) -> Option<T> {
        self.value().and_then(std::result::Result::ok)
    }

    /// The failure, if completed with one.
    #[must_use]
    pub fn exception(&self) -> Option<Error> {
        self.value().and_then(std::result::Result::err)
    }

    /// Returns the success value, `None` while pending, or the recorded failure.
    pub fn result_or_exception(&self) -> Result<Option<T>> {
        self.value().transpose()
    }

    /// Blocks up to `min(duration, time_left())` and returns the outcome seen.
    ///
    /// Never fails on timeout; returns `None` if still pending.
    #[must_use]
    pub fn result_within(&self, duration: Duration) -> Option<Outcome<T>> {
        self.state.wait_within(duration);
        self.value()
    }

    /// Waits for the deadline-bounded result and returns it.
    ///
    /// Fails with the recorded failure or with [`ErrorKind::Timeout`].
    pub fn get(&self) -> Result<T> {
        self.wait()?;
        self.value()
            .unwrap_or_else(|| Err(Error::timeout(self.timeout())))
    }
}

impl<T: Clone + Send + 'static> Future<T> {
    /// Creates a future that is already completed with `outcome`.
    #[must_use]
    pub fn completed(outcome: Outcome<T>) -> Self {
        let promise = CompletableFuture::new();
        promise.complete(outcome);
        promise.future()
    }

    /// Creates a future already completed with `value`.
    #[must_use]
    pub fn successful(value: T) -> Self {
        Self::completed(Ok(value))
    }

    /// Creates a future already completed with `error`.
    #[must_use]
    pub fn failed(error: Error) -> Self {
        Self::completed(Err(error))
    }
}

impl<T: Send + 'static> Future<T> {
    /// Registers `callback` to run once with the completed future.
    ///
    /// If the future is already completed the callback runs immediately on
    /// the calling thread; otherwise it runs on the thread that completes
    /// the future. A callback racing with completion runs exactly once.
    pub fn on_complete<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&Self) + Send + 'static,
    {
        if let Some(listener) = self.state.register(Box::new(callback)) {
            self.notify(listener);
        } else {
            tracing::trace!("listener registered on pending future");
        }
        self
    }

    fn notify(&self, listener: Listener<T>) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(self))) {
            let error = Error::from_panic(ErrorKind::Panicked, payload.as_ref());
            self.sink().report(&error, "on_complete");
        }
    }

    /// Creates an empty future that inherits this one's sink and remaining budget.
    pub(crate) fn derive<U: Send + 'static>(&self) -> CompletableFuture<U> {
        CompletableFuture::with_sink(self.time_left(), Arc::clone(self.sink()))
    }
}

/// Write-capable handle that completes a [`Future`] exactly once.
///
/// Dereferences to the read-only [`Future`]; hand out [`future`](Self::future)
/// to code that must only observe the result.
pub struct CompletableFuture<T> {
    future: Future<T>,
}

impl<T> Clone for CompletableFuture<T> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl<T> fmt::Debug for CompletableFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompletableFuture").field(&self.future).finish()
    }
}

impl<T> Deref for CompletableFuture<T> {
    type Target = Future<T>;

    fn deref(&self) -> &Future<T> {
        &self.future
    }
}

impl<T: Send + 'static> Default for CompletableFuture<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> CompletableFuture<T> {
    /// Creates a pending future with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a pending future with the configured default timeout.
    #[must_use]
    pub fn from_config(config: &FutureConfig) -> Self {
        Self::with_timeout(config.default_timeout)
    }

    /// Creates a pending future whose deadline is `now + timeout`.
    ///
    /// A zero timeout makes every [`wait`](Future::wait) non-blocking.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_sink(timeout, default_sink())
    }

    /// Creates a pending future reporting failures to `sink`.
    #[must_use]
    pub fn with_sink(timeout: Duration, sink: Arc<dyn FailureSink>) -> Self {
        Self {
            future: Future {
                state: Arc::new(State::new(timeout, sink)),
            },
        }
    }

    /// The read-only view of this future.
    #[must_use]
    pub fn future(&self) -> Future<T> {
        self.future.clone()
    }

    /// Records `outcome` if nothing has been recorded yet, then runs listeners.
    ///
    /// Later calls are no-ops. Returns `true` if this call won.
    pub fn try_complete(&self, outcome: Outcome<T>) -> bool {
        match self.future.state.try_complete(outcome) {
            Some(listeners) => {
                tracing::trace!(listeners = listeners.len(), "future completed");
                for listener in listeners {
                    self.future.notify(listener);
                }
                true
            }
            None => {
                tracing::debug!("ignoring completion of an already completed future");
                false
            }
        }
    }

    /// Records `outcome` if nothing has been recorded yet. Idempotent.
    pub fn complete(&self, outcome: Outcome<T>) -> &Self {
        self.try_complete(outcome);
        self
    }

    /// Completes with a success value.
    pub fn complete_with_result(&self, value: T) -> &Self {
        self.complete(Ok(value))
    }

    /// Completes with a failure.
    pub fn complete_with_error(&self, error: Error) -> &Self {
        self.complete(Err(error))
    }
}

impl<T: Clone + Send + 'static> CompletableFuture<T> {
    /// Completes this future with `other`'s outcome once `other` completes.
    pub fn complete_with(&self, other: &Future<T>) -> &Self {
        let target = self.clone();
        other.on_complete(move |source| {
            if let Some(outcome) = source.value() {
                target.complete(outcome);
            }
        });
        self
    }
}
