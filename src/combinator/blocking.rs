//! Blocking convenience wrappers.
//!
//! Each call suspends the calling thread until the relevant futures have
//! completed or their deadlines have passed. A timeout is returned to the
//! caller as [`ErrorKind::Timeout`](crate::ErrorKind::Timeout) and leaves
//! the futures pending.

use super::first::first_completed_of;
use crate::error::Result;
use crate::future::Future;
use std::borrow::Borrow;
use std::time::Duration;

/// Blocks until every future has completed.
///
/// Each future is waited on up to its own deadline. Fails with the first
/// timeout encountered; failures recorded in the futures are not inspected.
pub fn await_all<T, I>(futures: I) -> Result<()>
where
    I: IntoIterator,
    I::Item: Borrow<Future<T>>,
{
    for future in futures {
        future.borrow().wait()?;
    }
    Ok(())
}

/// Blocks until one of `futures` completes and returns that outcome as a future.
///
/// The returned future is already completed. Fails with a timeout if none
/// of the inputs completed within `timeout`.
pub fn await_one<T, I>(futures: I, timeout: Duration) -> Result<Future<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator,
    I::Item: Borrow<Future<T>>,
{
    let first = first_completed_of(futures, timeout);
    first.wait()?;
    Ok(first)
}

/// Blocks until either `left` or `right` completes and returns its value.
///
/// Fails with the winner's failure, or with a timeout if neither completes
/// within `timeout`.
pub fn await_either<T>(left: &Future<T>, right: &Future<T>, timeout: Duration) -> Result<T>
where
    T: Clone + Send + 'static,
{
    first_completed_of([left, right], timeout).get()
}

/// Blocks until every future has completed, then applies `f` to each in input order.
pub fn await_map<T, B, I, F>(futures: I, mut f: F) -> Result<Vec<B>>
where
    I: IntoIterator,
    I::Item: Borrow<Future<T>>,
    F: FnMut(&Future<T>) -> B,
{
    let futures: Vec<I::Item> = futures.into_iter().collect();
    for future in &futures {
        future.borrow().wait()?;
    }
    Ok(futures.iter().map(|future| f(future.borrow())).collect())
}
