//! Combinators over many futures.
//!
//! These never block and never lock across futures: each input gets one
//! `on_complete` callback that pushes its outcome into a shared aggregate.
//!
//! - [`first_completed_of`]: the first outcome among the inputs wins
//! - [`fold`]: aggregate all success values in completion order
//! - [`reduce`]: like `fold`, seeded by whichever input completes first
//! - [`sequence`]: collect all values in input order
//! - [`traverse`]: map inputs to futures, then `sequence`
//! - [`blocking`]: `await_all`, `await_one`, `await_either`, `await_map`

pub mod blocking;
pub mod first;
pub mod fold;
pub mod sequence;

pub use blocking::{await_all, await_either, await_map, await_one};
pub use first::first_completed_of;
pub use fold::{fold, reduce};
pub use sequence::{sequence, traverse};

use crate::future::Future;
use crate::observability::{default_sink, FailureSink};
use std::sync::Arc;

/// The sink an aggregate over `futures` reports to: the first input's, else the default.
fn sink_of<T>(futures: &[Future<T>]) -> Arc<dyn FailureSink> {
    futures
        .first()
        .map_or_else(default_sink, |f| Arc::clone(f.sink()))
}
