//! First-completed combinator.

use super::sink_of;
use crate::future::{CompletableFuture, Future};
use std::borrow::Borrow;
use std::time::Duration;

/// Returns a future completed with the outcome of whichever input completes first.
///
/// Every input tries to complete the shared result; the one-shot slot keeps
/// only the first attempt. Failures race like successes. With no inputs the
/// result never completes.
pub fn first_completed_of<T, I>(futures: I, timeout: Duration) -> Future<T>
where
    T: Clone + Send + 'static,
    I: IntoIterator,
    I::Item: Borrow<Future<T>>,
{
    let futures: Vec<Future<T>> = futures.into_iter().map(|f| f.borrow().clone()).collect();
    let result = CompletableFuture::with_sink(timeout, sink_of(&futures));

    for future in &futures {
        let target = result.clone();
        future.on_complete(move |source| {
            if let Some(outcome) = source.value() {
                target.complete(outcome);
            }
        });
    }

    result.future()
}
