//! Input-ordered collection: sequence and traverse.
//!
//! `sequence` gives every input one `on_complete` callback that stores its
//! outcome in a pre-sized slot vector. A cursor then walks the consecutive
//! filled slots from the front in a plain loop, so values land in input
//! order however the inputs complete, and the stack depth stays constant
//! even when the first input is the last to complete.
//!
//! ```text
//! on input i completing:
//!   slots[i] ← outcome
//!   while slots[next] is filled:
//!     Err(e) → complete(result, e), stop
//!     Ok(v)  → values.push(v), next += 1
//!   if next == n → complete(result, values)
//! ```

use super::sink_of;
use crate::error::Outcome;
use crate::future::{CompletableFuture, Future};
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::sync::Arc;
use std::time::Duration;

/// Slots and read cursor shared by the per-input callbacks of one sequence.
struct Cursor<T> {
    slots: Vec<Option<Outcome<T>>>,
    next: usize,
    values: Vec<T>,
    done: bool,
}

impl<T> Cursor<T> {
    fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
            next: 0,
            values: Vec::with_capacity(len),
            done: false,
        }
    }

    /// Consumes the filled prefix; returns the final outcome once it is known.
    fn advance(&mut self) -> Option<Outcome<Vec<T>>> {
        if self.done {
            return None;
        }
        while let Some(outcome) = self.slots.get_mut(self.next).and_then(Option::take) {
            self.next += 1;
            match outcome {
                Ok(value) => self.values.push(value),
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
        if self.next == self.slots.len() {
            self.done = true;
            return Some(Ok(std::mem::take(&mut self.values)));
        }
        None
    }
}

/// Collects the success values of `futures` in input order.
///
/// Empty input completes immediately with an empty `Vec`. If any input
/// fails, the result fails with the lowest-indexed failure whose
/// predecessors all succeeded.
pub fn sequence<T, I>(futures: I, timeout: Duration) -> Future<Vec<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator,
    I::Item: Borrow<Future<T>>,
{
    let futures: Vec<Future<T>> = futures.into_iter().map(|f| f.borrow().clone()).collect();
    let result = CompletableFuture::with_sink(timeout, sink_of(&futures));

    if futures.is_empty() {
        result.complete_with_result(Vec::new());
        return result.future();
    }

    let cursor = Arc::new(Mutex::new(Cursor::new(futures.len())));

    for (index, future) in futures.iter().enumerate() {
        let cursor = Arc::clone(&cursor);
        let target = result.clone();
        future.on_complete(move |source| {
            let Some(outcome) = source.value() else {
                return;
            };
            let finished = {
                let mut cursor = cursor.lock();
                if cursor.done {
                    return;
                }
                if let Some(slot) = cursor.slots.get_mut(index) {
                    *slot = Some(outcome);
                }
                cursor.advance()
            };
            if let Some(outcome) = finished {
                target.complete(outcome);
            }
        });
    }

    result.future()
}

/// Maps each element of `input` to a future with `f`, then [`sequence`]s them.
pub fn traverse<A, T, I, F>(input: I, timeout: Duration, f: F) -> Future<Vec<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> Future<T>,
{
    let futures: Vec<Future<T>> = input.into_iter().map(f).collect();
    sequence(futures, timeout)
}
