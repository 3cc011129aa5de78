//! Non-blocking aggregation: fold and reduce.
//!
//! # Completion protocol
//!
//! ```text
//! fold(zero, [f1..fn], op):
//!   remaining ← n
//!   on each fi completing:
//!     if result completed  → return            // first failure already won
//!     if fi failed         → complete(result, failure)
//!     else                 → collected.push(v)
//!                            if remaining.fetch_sub(1) == 1:
//!                              complete(result, collected.fold(zero, op))
//! ```
//!
//! The push happens before the decrement, so the single callback that takes
//! the countdown to zero sees every value. Values are folded in the order
//! their futures completed, not in input order.

use super::sink_of;
use crate::error::{Error, Outcome};
use crate::future::{guarded, CompletableFuture, Future};
use crate::observability::FailureSink;
use crossbeam_queue::SegQueue;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// State shared by the per-input callbacks of one fold.
struct FoldState<T, R, F> {
    remaining: AtomicUsize,
    collected: SegQueue<T>,
    /// Zero and operator, taken once by the callback that finishes the fold.
    finish: Mutex<Option<(R, F)>>,
}

impl<T, R, F> FoldState<T, R, F>
where
    F: FnMut(R, T) -> R,
{
    fn run(&self, sink: &dyn FailureSink) -> Option<Outcome<R>> {
        let (zero, mut op) = self.finish.lock().take()?;
        Some(guarded(sink, "fold", || {
            let mut acc = zero;
            while let Some(value) = self.collected.pop() {
                acc = op(acc, value);
            }
            acc
        }))
    }

    fn clear(&self) {
        while self.collected.pop().is_some() {}
    }
}

/// Folds the success values of `futures` with `op`, starting from `zero`.
///
/// Empty input completes immediately with `zero`. The first failure among
/// the inputs completes the result and `op` never runs. A panic in `op`
/// completes the result with a `Transformation` error.
pub fn fold<T, R, I, F>(zero: R, futures: I, timeout: Duration, op: F) -> Future<R>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
    I: IntoIterator,
    I::Item: Borrow<Future<T>>,
    F: FnMut(R, T) -> R + Send + 'static,
{
    let futures: Vec<Future<T>> = futures.into_iter().map(|f| f.borrow().clone()).collect();
    let sink = sink_of(&futures);
    fold_in(zero, &futures, CompletableFuture::with_sink(timeout, sink), op)
}

fn fold_in<T, R, F>(zero: R, futures: &[Future<T>], result: CompletableFuture<R>, op: F) -> Future<R>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
    F: FnMut(R, T) -> R + Send + 'static,
{
    if futures.is_empty() {
        result.complete_with_result(zero);
        return result.future();
    }

    let state = Arc::new(FoldState {
        remaining: AtomicUsize::new(futures.len()),
        collected: SegQueue::new(),
        finish: Mutex::new(Some((zero, op))),
    });

    for future in futures {
        let state = Arc::clone(&state);
        let target = result.clone();
        future.on_complete(move |source| {
            if target.is_completed() {
                return;
            }
            match source.value() {
                Some(Ok(value)) => {
                    state.collected.push(value);
                    if state.remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
                        if let Some(outcome) = state.run(target.sink().as_ref()) {
                            target.complete(outcome);
                        }
                    }
                }
                Some(Err(error)) => {
                    target.complete(Err(error));
                    state.clear();
                }
                None => {}
            }
        });
    }

    result.future()
}

/// Folds with `op`, seeded by the value of whichever input completes first.
///
/// Empty input fails with `UnsupportedOperation`. If the first input to
/// complete failed, the result fails with that error.
pub fn reduce<T, I, F>(futures: I, timeout: Duration, op: F) -> Future<T>
where
    T: Clone + Send + 'static,
    I: IntoIterator,
    I::Item: Borrow<Future<T>>,
    F: FnMut(T, T) -> T + Send + 'static,
{
    let futures: Vec<Future<T>> = futures.into_iter().map(|f| f.borrow().clone()).collect();
    let result = CompletableFuture::with_sink(timeout, sink_of(&futures));

    if futures.is_empty() {
        result.complete_with_error(Error::unsupported("reduce over an empty collection"));
        return result.future();
    }

    let seeded = Arc::new(AtomicBool::new(false));
    let op = Arc::new(Mutex::new(Some(op)));
    let inputs = Arc::new(futures);

    for (index, future) in inputs.iter().enumerate() {
        let seeded = Arc::clone(&seeded);
        let op = Arc::clone(&op);
        let inputs = Arc::clone(&inputs);
        let target = result.clone();
        future.on_complete(move |source| {
            if seeded
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return;
            }
            match source.value() {
                Some(Ok(seed)) => {
                    let Some(op) = op.lock().take() else {
                        return;
                    };
                    let rest: Vec<Future<T>> = inputs
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != index)
                        .map(|(_, f)| f.clone())
                        .collect();
                    let folded = fold_in(seed, &rest, target.derive::<T>(), op);
                    target.complete_with(&folded);
                }
                Some(Err(error)) => {
                    target.complete(Err(error));
                }
                None => {}
            }
        });
    }

    result.future()
}
