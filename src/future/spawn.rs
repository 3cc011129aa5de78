//! Running a producer body on an [`Executor`] and handing back its future.

use super::{CompletableFuture, Future};
use crate::error::{Error, ErrorKind, Result};
use crate::executor::Executor;
use crate::observability::{default_sink, FailureSink};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// Runs `body` on `executor` and returns a future receiving its outcome.
///
/// A returned error completes the future with that error; a panic completes
/// it with [`ErrorKind::Panicked`]. Both are also reported to the default
/// failure sink.
pub fn spawn<T, E, F>(executor: &E, timeout: Duration, body: F) -> Future<T>
where
    T: Send + 'static,
    E: Executor + ?Sized,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    spawn_with_sink(executor, timeout, default_sink(), body)
}

/// Like [`spawn`], reporting failures to `sink`.
pub fn spawn_with_sink<T, E, F>(
    executor: &E,
    timeout: Duration,
    sink: Arc<dyn FailureSink>,
    body: F,
) -> Future<T>
where
    T: Send + 'static,
    E: Executor + ?Sized,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let promise = CompletableFuture::with_sink(timeout, sink);
    let target = promise.clone();

    executor.execute(Box::new(move || {
        let outcome = match catch_unwind(AssertUnwindSafe(body)) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                target.sink().report(&error, "spawn");
                Err(error)
            }
            Err(payload) => {
                let error = Error::from_panic(ErrorKind::Panicked, payload.as_ref());
                target.sink().report(&error, "spawn");
                Err(error)
            }
        };
        target.complete(outcome);
    }));

    promise.future()
}
