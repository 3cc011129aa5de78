//! Execution seam for producer bodies.
//!
//! Futures never need an executor to complete or to run combinators: those
//! only register callbacks. An [`Executor`] is used solely by
//! [`spawn`](crate::future::spawn), which schedules a producer body and
//! returns a future wired to its outcome.
//!
//! Scheduling is left to the caller. Implement [`Executor`] over whatever
//! thread pool or runtime the application already owns; the crate ships
//! only [`CallingThread`], which runs work inline.

use std::sync::Arc;

/// A zero-argument unit of work.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Runs units of work asynchronously.
///
/// The executor itself is the dispatch target: it decides which thread runs
/// the work and when.
pub trait Executor: Send + Sync {
    /// Submits `work` for execution.
    fn execute(&self, work: Work);
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, work: Work) {
        (**self).execute(work);
    }
}

/// Executor that runs work immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallingThread;

impl Executor for CallingThread {
    fn execute(&self, work: Work) {
        work();
    }
}
